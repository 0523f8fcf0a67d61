use serde::Deserialize;

/// Shown in place of a statistic that has no value.
pub const NO_DATA: &str = "No Data";

/// Render an amount as US currency text, e.g. `$12,345.67`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = amount < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Currency text for an optional statistic.
pub fn format_optional_currency(amount: Option<f64>) -> String {
    amount.map(format_currency).unwrap_or_else(|| NO_DATA.to_string())
}

/// Parse currency text produced by [`format_currency`] (or a plain number).
pub fn parse_currency(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

// ---------------------------------------------------------------------------
// External reference links
// ---------------------------------------------------------------------------

/// Deep link into the grants management system: `{base}{request id}{suffix}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkTemplate {
    pub base: String,
    pub suffix: String,
}

impl Default for LinkTemplate {
    fn default() -> Self {
        LinkTemplate {
            base: "https://hewlett.lightning.force.com/lightning/r/Request__c/".into(),
            suffix: "/view".into(),
        }
    }
}

impl LinkTemplate {
    pub fn url_for(&self, request_id: &str) -> String {
        format!("{}{}{}", self.base, request_id.trim(), self.suffix)
    }
}

/// HTML anchor opening `url` in a new tab, as written to the CSV export.
pub fn html_anchor(url: &str, text: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\">{}</a>",
        escape_html(url),
        escape_html(text)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
