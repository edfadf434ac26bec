use std::fmt::Write;

use crate::assets::decorated::DecoratedAsset;
use crate::board::route::Route;
use crate::format::{format_percent_change, is_profit};

const HEADERS: [&str; 5] = ["Coin", "Market cap", "Price", "Volume", "24h change"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStyle {
    Profit,
    Loss,
}

impl ChangeStyle {
    pub fn css_class(&self) -> &'static str {
        match self {
            ChangeStyle::Profit => "profit",
            ChangeStyle::Loss => "loss",
        }
    }
}

/// One table row, ready for either output format.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub detail_path: String,
    pub icon_url: String,
    pub name: String,
    pub symbol: String,
    pub market_cap: String,
    pub price: String,
    pub volume: String,
    pub change: String,
    pub change_style: ChangeStyle,
}

impl TableRow {
    pub fn new(asset: &DecoratedAsset, icon_base_url: &str) -> Self {
        let record = asset.record();
        let change = record.change_percent24_hr.as_deref();

        Self {
            detail_path: Route::Detail(record.id.clone()).path(),
            icon_url: icon_url(icon_base_url, &record.symbol),
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            market_cap: asset.formatted_market_cap().to_string(),
            price: asset.formatted_price().to_string(),
            volume: asset.formatted_volume().to_string(),
            change: format_percent_change(change),
            change_style: if is_profit(change) {
                ChangeStyle::Profit
            } else {
                ChangeStyle::Loss
            },
        }
    }

    fn coin_label(&self) -> String {
        format!("{} | {}", self.name, self.symbol)
    }
}

pub fn table_rows<'a>(
    assets: impl Iterator<Item = &'a DecoratedAsset>,
    icon_base_url: &str,
) -> Vec<TableRow> {
    assets.map(|asset| TableRow::new(asset, icon_base_url)).collect()
}

pub fn icon_url(icon_base_url: &str, symbol: &str) -> String {
    format!(
        "{}/{}@2x.png",
        icon_base_url.trim_end_matches('/'),
        symbol.to_lowercase()
    )
}

/// Fixed-width table for the terminal. Changes get a `+`/`-` marker
/// column since there is no styling.
pub fn render_text(rows: &[TableRow], banner: Option<&str>) -> String {
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            let marker = match row.change_style {
                ChangeStyle::Profit => "+",
                ChangeStyle::Loss => "-",
            };
            [
                row.coin_label(),
                row.market_cap.clone(),
                row.price.clone(),
                row.volume.clone(),
                format!("{} {}", marker, row.change),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_text_line(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(rule.join("-+-").as_str());
    out.push('\n');
    for line in &cells {
        push_text_line(&mut out, line, &widths);
    }

    if rows.is_empty() {
        out.push_str("(no assets loaded)\n");
    }
    if let Some(banner) = banner {
        let _ = writeln!(out, "! {}", banner);
    }
    out
}

fn push_text_line(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let mut parts = Vec::with_capacity(cells.len());
    for (i, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        let pad = width - cell.chars().count();
        // Coin column reads left to right, money columns line up on the right.
        if i == 0 {
            parts.push(format!("{}{}", cell, " ".repeat(pad)));
        } else {
            parts.push(format!("{}{}", " ".repeat(pad), cell));
        }
    }
    out.push_str(parts.join(" | ").trim_end());
    out.push('\n');
}

/// HTML table with the same columns; the coin cell links to the detail
/// route and the change cell carries a `profit` or `loss` class.
pub fn render_html(rows: &[TableRow]) -> String {
    let mut out = String::from("<table>\n  <thead>\n    <tr>\n");
    for header in HEADERS {
        let _ = writeln!(out, "      <th scope=\"col\">{}</th>", header);
    }
    out.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for row in rows {
        out.push_str("    <tr>\n");
        let _ = writeln!(
            out,
            "      <td data-label=\"Coin\"><div class=\"name\"><img class=\"logo\" alt=\"Crypto logo\" src=\"{}\"><a href=\"{}\"><span>{}</span> | {}</a></div></td>",
            escape_html(&row.icon_url),
            escape_html(&row.detail_path),
            escape_html(&row.name),
            escape_html(&row.symbol)
        );
        let _ = writeln!(out, "      <td data-label=\"Market cap\">{}</td>", escape_html(&row.market_cap));
        let _ = writeln!(out, "      <td data-label=\"Price\">{}</td>", escape_html(&row.price));
        let _ = writeln!(out, "      <td data-label=\"Volume\">{}</td>", escape_html(&row.volume));
        let _ = writeln!(
            out,
            "      <td class=\"{}\" data-label=\"24h change\"><span>{}</span></td>",
            row.change_style.css_class(),
            escape_html(&row.change)
        );
        out.push_str("    </tr>\n");
    }

    out.push_str("  </tbody>\n</table>\n");
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::response::tests::record;

    const ICONS: &str = "https://assets.coincap.io/assets/icons";

    fn row(change: Option<&str>) -> TableRow {
        let mut raw = record("bitcoin", "BTC");
        raw.name = "Bitcoin".to_string();
        raw.change_percent24_hr = change.map(str::to_string);
        TableRow::new(&DecoratedAsset::new(raw), ICONS)
    }

    #[test]
    fn test_icon_url() {
        assert_eq!(
            "https://assets.coincap.io/assets/icons/btc@2x.png",
            icon_url(ICONS, "BTC")
        );
        assert_eq!(
            "https://assets.coincap.io/assets/icons/usdt@2x.png",
            icon_url("https://assets.coincap.io/assets/icons/", "USDT")
        );
    }

    #[test]
    fn test_row_profit() {
        let positive = row(Some("5.1234"));
        assert_eq!("/detail/bitcoin", positive.detail_path);
        assert_eq!("https://assets.coincap.io/assets/icons/btc@2x.png", positive.icon_url);
        assert_eq!("$43,000.50", positive.price);
        assert_eq!("5.123", positive.change);
        assert_eq!(ChangeStyle::Profit, positive.change_style);
    }

    #[test]
    fn test_row_loss() {
        let negative = row(Some("-2.0"));
        assert_eq!("-2.000", negative.change);
        assert_eq!(ChangeStyle::Loss, negative.change_style);

        let missing = row(None);
        assert_eq!("-", missing.change);
        assert_eq!(ChangeStyle::Loss, missing.change_style);
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&[row(Some("5.1234"))], None);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(3, lines.len());
        assert!(lines[0].starts_with("Coin"));
        assert!(lines[2].starts_with("Bitcoin | BTC"));
        assert!(lines[2].contains("$43,000.50"));
        assert!(lines[2].ends_with("+ 5.123"));
    }

    #[test]
    fn test_render_text_empty_with_banner() {
        let text = render_text(&[], Some("Could not load assets at offset 0"));
        assert!(text.contains("(no assets loaded)"));
        assert!(text.ends_with("! Could not load assets at offset 0\n"));
    }

    #[test]
    fn test_render_html() {
        let html = render_html(&[row(Some("5.1234")), row(Some("-2.0"))]);
        assert!(html.contains("<th scope=\"col\">24h change</th>"));
        assert!(html.contains("<a href=\"/detail/bitcoin\"><span>Bitcoin</span> | BTC</a>"));
        assert!(html.contains("src=\"https://assets.coincap.io/assets/icons/btc@2x.png\""));
        assert!(html.contains("<td class=\"profit\" data-label=\"24h change\"><span>5.123</span></td>"));
        assert!(html.contains("<td class=\"loss\" data-label=\"24h change\"><span>-2.000</span></td>"));
        assert_eq!(2, html.matches("<tr>\n      <td").count());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!("a &lt;b&gt; &amp; &quot;c&quot;", escape_html("a <b> & \"c\""));
    }
}
