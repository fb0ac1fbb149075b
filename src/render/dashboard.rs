use crate::domain::model::{SearchCriteria, Tag};
use crate::render::snapshot::ExportedListing;
use chrono::{DateTime, Local, Utc};
use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLES: &str = r#"
:root {
  --bg: #0c0c0f; --surface: #16161a; --surface2: #1e1e24; --border: #2a2a32;
  --text: #e8e6e3; --text2: #9a9a9f; --accent: #ff6b35; --green: #4caf50;
  --blue: #42a5f5; --purple: #ab47bc; --radius: 12px;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: system-ui, sans-serif; background: var(--bg); color: var(--text); line-height: 1.5; }
.header { padding: 2rem; border-bottom: 1px solid var(--border); }
.header-inner, .stats, .grid, .empty { max-width: 1400px; margin: 0 auto; }
.header-inner { display: flex; justify-content: space-between; align-items: flex-end; flex-wrap: wrap; gap: 1rem; }
.header h1 { font-size: 1.75rem; letter-spacing: -0.03em; }
.meta { font-family: monospace; font-size: 0.8rem; color: var(--text2); text-align: right; }
.stats { display: flex; gap: 1rem; padding: 1.25rem 2rem; flex-wrap: wrap; }
.stat { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 0.75rem 1.25rem; }
.stat .value { font-size: 1.4rem; font-weight: 700; }
.stat .label { font-size: 0.75rem; color: var(--text2); text-transform: uppercase; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(320px, 1fr)); gap: 1.25rem; padding: 0 2rem 3rem; }
.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); overflow: hidden; display: flex; flex-direction: column; }
.card img { width: 100%; height: 190px; object-fit: cover; background: var(--surface2); }
.card .no-photo { height: 190px; display: flex; align-items: center; justify-content: center; background: var(--surface2); color: var(--text2); }
.card-body { padding: 1rem 1.1rem; display: flex; flex-direction: column; gap: 0.5rem; flex: 1; }
.card-top { display: flex; justify-content: space-between; align-items: baseline; }
.price { font-size: 1.3rem; font-weight: 700; }
.score { font-family: monospace; font-weight: 700; color: var(--accent); }
.address { font-size: 0.9rem; color: var(--text2); }
.facts { font-size: 0.85rem; display: flex; gap: 0.75rem; flex-wrap: wrap; }
.tags { display: flex; gap: 0.35rem; flex-wrap: wrap; }
.tag { font-size: 0.72rem; padding: 0.15rem 0.55rem; border-radius: 999px; background: var(--surface2); }
.tag.new { background: #1b5e20; }
.tag.value { background: #0d47a1; }
.tag.space { background: #4a148c; }
.amenities { font-size: 0.75rem; color: var(--text2); }
.card-footer { display: flex; justify-content: space-between; align-items: center; font-size: 0.8rem; margin-top: auto; padding-top: 0.5rem; }
.card-footer a { color: var(--blue); text-decoration: none; }
.verified { color: var(--green); }
.source { color: var(--text2); text-transform: capitalize; }
.empty { padding: 4rem 2rem; text-align: center; color: var(--text2); }
"#;

pub struct DashboardView<'a> {
    pub criteria: &'a SearchCriteria,
    pub listings: &'a [ExportedListing],
    pub generated_at: DateTime<Utc>,
}

pub fn render_dashboard(view: &DashboardView<'_>) -> String {
    dashboard_page(view).into_string()
}

fn dashboard_page(view: &DashboardView<'_>) -> Markup {
    let generated = view
        .generated_at
        .with_timezone(&Local)
        .format("%B %d, %Y at %I:%M %p")
        .to_string();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Apartment Hunter - " (view.criteria.city) }
                style { (PreEscaped(STYLES)) }
            }
            body {
                header class="header" {
                    div class="header-inner" {
                        h1 { "🏠 Apartment Hunter" }
                        div class="meta" {
                            div { (search_summary(view.criteria)) }
                            div { "Generated " (generated) }
                        }
                    }
                }
                @if view.listings.is_empty() {
                    (empty_state())
                } @else {
                    (stats_bar(view.listings))
                    main class="grid" {
                        @for (rank, listing) in view.listings.iter().enumerate() {
                            (listing_card(rank + 1, listing))
                        }
                    }
                }
            }
        }
    }
}

fn search_summary(criteria: &SearchCriteria) -> String {
    let mut summary = format!(
        "{}BR in {}, {}",
        criteria.bedrooms, criteria.city, criteria.state
    );
    if let Some(max) = criteria.max_price {
        summary.push_str(&format!(" · under {}", format_money(max as f64)));
    }
    summary
}

fn empty_state() -> Markup {
    html! {
        section class="empty" {
            h2 { "No listings found" }
            p { "Nothing matched this search. Try a wider price range, or run with --demo to preview the dashboard." }
        }
    }
}

fn stats_bar(listings: &[ExportedListing]) -> Markup {
    let new_count = listings.iter().filter(|l| l.is_new()).count();
    let prices: Vec<f64> = listings
        .iter()
        .filter_map(|l| l.price)
        .filter(|p| *p > 0.0)
        .collect();
    let avg_price = if prices.is_empty() {
        "-".to_string()
    } else {
        format_money(prices.iter().sum::<f64>() / prices.len() as f64)
    };
    let top_score = listings
        .iter()
        .map(|l| l.score)
        .fold(f64::NEG_INFINITY, f64::max);

    html! {
        section class="stats" {
            (stat(listings.len().to_string(), "Listings"))
            (stat(new_count.to_string(), "New"))
            (stat(avg_price, "Avg price"))
            (stat(format!("{:.1}", top_score), "Top score"))
        }
    }
}

fn stat(value: String, label: &str) -> Markup {
    html! {
        div class="stat" {
            div class="value" { (value) }
            div class="label" { (label) }
        }
    }
}

fn tag_class(tag: Tag) -> &'static str {
    match tag {
        Tag::New => "tag new",
        Tag::GreatValue => "tag value",
        Tag::Spacious => "tag space",
        _ => "tag",
    }
}

fn listing_card(rank: usize, listing: &ExportedListing) -> Markup {
    html! {
        article class="card" id=(listing.id) {
            @if listing.image.is_empty() {
                div class="no-photo" { "No photo" }
            } @else {
                img src=(listing.image) alt=(listing.title) loading="lazy";
            }
            div class="card-body" {
                div class="card-top" {
                    span class="price" {
                        @match listing.price {
                            Some(price) => { (format_money(price)) "/mo" },
                            None => "Price n/a",
                        }
                    }
                    span class="score" title="Score" { "#" (rank) " · " (format!("{:.1}", listing.score)) }
                }
                div class="address" {
                    (listing.address)
                    @if !listing.neighborhood.is_empty() {
                        " · " (listing.neighborhood)
                    }
                }
                div class="facts" {
                    @if let Some(beds) = listing.bedrooms { span { (beds) " bd" } }
                    @if let Some(baths) = listing.bathrooms { span { (baths) " ba" } }
                    @if let Some(sqft) = listing.sqft { span { (sqft) " sqft" } }
                    @if let Some(days) = listing.days_on_market { span { (days_label(days)) } }
                }
                @if !listing.tags.is_empty() {
                    div class="tags" {
                        @for tag in &listing.tags {
                            span class=(tag_class(*tag)) { (tag.label()) }
                        }
                    }
                }
                @if !listing.amenities.is_empty() {
                    div class="amenities" { (listing.amenities.join(" · ")) }
                }
                div class="card-footer" {
                    span class="source" { (listing.source.as_str()) }
                    a href=(listing.link.search_url) target="_blank" rel="noopener" {
                        @if listing.link.url_verified == Some(true) {
                            span class="verified" { "✓ " }
                        }
                        (listing.link.search_label)
                    }
                }
            }
        }
    }
}

fn days_label(days: i64) -> String {
    match days {
        i64::MIN..=0 => "Listed today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{} days ago", n),
    }
}

/// `$4,250` style; cents are dropped.
pub fn format_money(amount: f64) -> String {
    let whole = amount.round().max(0.0) as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    format!("${}", out)
}
