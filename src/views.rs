// src/views.rs
use std::fmt::Write;

use crate::models::{VolatilityDetails, VolatilitySnapshot};
use crate::services::settings::ShopConfig;
use crate::state::RateSheet;

const STYLE: &str = "body{font-family:Arial,sans-serif;margin:40px;color:#222}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:6px 12px;text-align:right}\
.fallback-banner{background:#fff3cd;padding:10px;border:1px solid #e0c36c}\
.state-low{color:#2e7d32}.state-medium{color:#ef6c00}.state-high{color:#c62828}";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

pub fn rate_sheet_page(sheet: &RateSheet) -> String {
    let shop = escape_html(&sheet.config.shop_name);
    let meta = &sheet.table.meta;
    let mut body = String::new();

    let _ = writeln!(body, "<h1 class=\"shop-name\">{}</h1>", shop);
    let _ = writeln!(
        body,
        "<p class=\"spot-price\">Gold spot price: <strong>{:.2}</strong> per troy ounce (updated {})</p>",
        sheet.spot.price,
        sheet.computed_at.format("%Y-%m-%d %H:%M:%S")
    );
    if sheet.spot.is_fallback {
        body.push_str(
            "<p class=\"fallback-banner\">Live price unavailable. Rates use the static fallback price.</p>\n",
        );
    }
    let _ = writeln!(
        body,
        "<p class=\"pricing-state\">Market volatility: <span class=\"state-{state}\">{state}</span> ({:.2}%), margin {}%</p>",
        meta.volatility_percent,
        meta.active_margin,
        state = meta.state
    );

    body.push_str("<table class=\"rates\">\n<tr><th>Karat</th><th>Melt value / g</th><th>Buy / pawn price / g</th></tr>\n");
    for (karat, entry) in sheet.table.rates.iter().rev() {
        let _ = writeln!(
            body,
            "<tr data-karat=\"{}\"><td>{}</td><td>{:.2}</td><td class=\"buy-price\">{:.2}</td></tr>",
            karat.value(),
            karat,
            entry.melt_value_per_gram,
            entry.buy_pawn_price_per_gram
        );
    }
    body.push_str("</table>\n");

    body.push_str("<h2>Loan calculator</h2>\n<form id=\"calculator\" method=\"post\" action=\"/calculate\">\n<select name=\"karat\">\n");
    for karat in sheet.table.rates.keys().rev() {
        let _ = writeln!(body, "<option value=\"{0}\">{0}k</option>", karat.value());
    }
    body.push_str(
        "</select>\n<input name=\"weight\" type=\"number\" step=\"0.01\" min=\"0.01\" placeholder=\"Weight (g)\">\n\
<button type=\"submit\">Calculate</button>\n</form>\n<pre id=\"result\"></pre>\n\
<script>\ndocument.getElementById('calculator').addEventListener('submit', async (e) => {\n\
  e.preventDefault();\n\
  const res = await fetch('/calculate', {method: 'POST', body: new URLSearchParams(new FormData(e.target))});\n\
  document.getElementById('result').textContent = JSON.stringify(await res.json(), null, 2);\n\
});\n</script>\n<p><a href=\"/admin\">Admin</a></p>",
    );

    page(&sheet.config.shop_name, &body)
}

pub fn admin_page(config: &ShopConfig, volatility: &VolatilitySnapshot) -> String {
    let margins = &config.volatility_margins;
    let thresholds = &config.volatility_thresholds;
    let mut body = String::new();

    let _ = writeln!(body, "<h1>{} admin</h1>", escape_html(&config.shop_name));

    let _ = writeln!(
        body,
        "<section class=\"volatility\"><h2>Current volatility</h2>\n<p>State: <span class=\"state-{state}\">{state}</span>, {:.2}%</p>",
        volatility.volatility_percent,
        state = volatility.state
    );
    match &volatility.details {
        VolatilityDetails::Range { min, max, avg, count } => {
            let _ = writeln!(
                body,
                "<p class=\"volatility-range\">Min {:.2} / max {:.2} / avg {:.2} over {} samples</p>",
                min, max, avg, count
            );
        }
        VolatilityDetails::InsufficientData { count } => {
            let _ = writeln!(
                body,
                "<p class=\"insufficient-data\">Insufficient data ({} samples in the last 14 days)</p>",
                count
            );
        }
    }
    body.push_str("</section>\n");

    let _ = write!(
        body,
        "<form id=\"settings\" method=\"post\" action=\"/admin/update\">\n\
<label>Shop name <input name=\"shop_name\" value=\"{}\"></label><br>\n\
<label>Interest per month (%) <input name=\"interest_percent\" value=\"{}\"></label><br>\n\
<label>Margin low (%) <input name=\"margin_low\" value=\"{}\"></label><br>\n\
<label>Margin medium (%) <input name=\"margin_medium\" value=\"{}\"></label><br>\n\
<label>Margin high (%) <input name=\"margin_high\" value=\"{}\"></label><br>\n\
<label>Low volatility below (%) <input name=\"threshold_low\" value=\"{}\"></label><br>\n\
<label>High volatility above (%) <input name=\"threshold_high\" value=\"{}\"></label><br>\n\
<button type=\"submit\">Save</button>\n</form>\n<p><a href=\"/\">Rate sheet</a></p>",
        escape_html(&config.shop_name),
        config.interest_percent(),
        margins.low,
        margins.medium,
        margins.high,
        thresholds.low_limit,
        thresholds.high_limit
    );

    page("Admin", &body)
}

/// Internal tool only: the failure detail is shown to the operator.
pub fn error_page(detail: &str) -> String {
    page(
        "Internal Server Error",
        &format!(
            "<h1>Internal Server Error</h1>\n<p>The server encountered an error.</p>\n<pre class=\"error-detail\">{}</pre>",
            escape_html(detail)
        ),
    )
}
