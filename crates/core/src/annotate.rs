use once_cell::sync::Lazy;
use regex::Regex;

use crate::i18n::{Locale, Translations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Planning,
    Shopping,
    Accommodation,
    Transportation,
    Other,
}

/// Scan order for [`categorize`]. `Other` is the fallback and is never scanned.
const SCAN_ORDER: [Category; 4] = [
    Category::Planning,
    Category::Shopping,
    Category::Accommodation,
    Category::Transportation,
];

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Planning => "planning",
            Category::Shopping => "shopping",
            Category::Accommodation => "accommodation",
            Category::Transportation => "transportation",
            Category::Other => "other",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Planning => "🗺️",
            Category::Shopping => "🛒",
            Category::Accommodation => "🏨",
            Category::Transportation => "🚗",
            Category::Other => "📝",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Planning => &["申請", "安排", "規劃", "準備", "路線", "行程"],
            Category::Shopping => &["購買", "超市"],
            Category::Accommodation => &["住宿", "住宿預訂"],
            Category::Transportation => &["駕照", "國際駕照", "租車", "租車預訂"],
            Category::Other => &[],
        }
    }

    pub fn label<'a>(&self, tr: &'a Translations) -> &'a str {
        tr.t(match self {
            Category::Planning => "categoryPlanning",
            Category::Shopping => "categoryShopping",
            Category::Accommodation => "categoryAccommodation",
            Category::Transportation => "categoryTransportation",
            Category::Other => "categoryOther",
        })
    }
}

/// First category in scan order with a keyword contained in `text`
/// (case-insensitive); [`Category::Other`] when nothing matches.
pub fn categorize(text: &str) -> Category {
    let haystack = text.to_lowercase();
    SCAN_ORDER
        .into_iter()
        .find(|category| {
            category
                .keywords()
                .iter()
                .any(|keyword| haystack.contains(&keyword.to_lowercase()))
        })
        .unwrap_or(Category::Other)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBadge {
    pub month: u32,
    pub day: u32,
}

impl DateBadge {
    pub fn month_label(&self, locale: Locale) -> String {
        // month is validated on extraction
        locale
            .month_label(self.month)
            .unwrap_or_else(|| self.month.to_string())
    }

    pub fn label(&self, locale: Locale) -> String {
        match locale {
            Locale::ZhTw => format!("{}{}日", self.month_label(locale), self.day),
            Locale::En => format!("{} {}", self.month_label(locale), self.day),
        }
    }
}

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2})/(\d{2})").expect("valid regex"));

/// First `MM/DD` token in `text`. A month outside 1–12 or a day outside
/// 1–31 yields no badge.
pub fn extract_date(text: &str) -> Option<DateBadge> {
    let captures = DATE_RE.captures(text)?;
    let month: u32 = captures[1].parse().ok()?;
    let day: u32 = captures[2].parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(DateBadge { month, day })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBadge {
    pub amount: String,
}

impl PriceBadge {
    pub fn label(&self) -> String {
        format!("{} NZD", self.amount)
    }
}

static PRICE_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(\d+)\s*紐幣").expect("valid regex"),
        Regex::new(r"(\d+)\s*紐西蘭幣").expect("valid regex"),
        Regex::new(r"(\d+)\s*紐").expect("valid regex"),
    ]
});

/// Amount of the first price pattern that matches, tried in a fixed order.
pub fn extract_price(text: &str) -> Option<PriceBadge> {
    PRICE_PATTERNS.iter().find_map(|pattern| {
        pattern.captures(text).map(|captures| PriceBadge {
            amount: captures[1].to_string(),
        })
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub category: Category,
    pub date: Option<DateBadge>,
    pub price: Option<PriceBadge>,
}

pub fn annotate(text: &str) -> Annotation {
    Annotation {
        category: categorize(text),
        date: extract_date(text),
        price: extract_price(text),
    }
}

/// Icon prefixed to todo items.
pub fn activity_icon(activity: &str) -> &'static str {
    if activity.contains("攜帶") {
        "🎒"
    } else if activity.contains("安排") {
        "📅"
    } else if activity.contains("確認") || activity.contains("預訂") {
        "✅"
    } else if activity.contains("購買") || activity.contains("兌換") {
        "💰"
    } else {
        "📝"
    }
}

pub const IMPORTANT_NOTE_MARKER: &str = "注意:";

/// Split an itinerary activity at the first `注意:` marker. The note part
/// keeps the text after the marker.
pub fn split_important_note(activity: &str) -> (&str, Option<&str>) {
    match activity.split_once(IMPORTANT_NOTE_MARKER) {
        Some((before, note)) => (before, Some(note)),
        None => (activity, None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    Booking,
    Airbnb,
    GoogleMaps,
    Other,
}

impl LinkSource {
    pub fn detect(url: &str) -> Self {
        if url.contains("booking.com") {
            LinkSource::Booking
        } else if url.contains("airbnb.com") {
            LinkSource::Airbnb
        } else if url.contains("google.com") || url.contains("goo.gl") {
            LinkSource::GoogleMaps
        } else {
            LinkSource::Other
        }
    }

    pub fn label<'a>(&self, tr: &'a Translations) -> &'a str {
        match self {
            LinkSource::Booking => "Booking.com",
            LinkSource::Airbnb => "Airbnb",
            LinkSource::GoogleMaps => tr.t("linkGoogleMaps"),
            LinkSource::Other => tr.t("linkDetails"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("申請 NZeTA 簽證", Category::Planning)]
    #[case("去超市買水", Category::Shopping)]
    #[case("確認皇后鎮住宿", Category::Accommodation)]
    #[case("辦理國際駕照", Category::Transportation)]
    #[case("換新台幣", Category::Other)]
    fn categorizes_by_keyword(#[case] text: &str, #[case] expected: Category) {
        assert_eq!(categorize(text), expected);
    }

    #[test]
    fn earliest_category_wins_on_multiple_matches() {
        assert_eq!(categorize("購買 租車 保險"), Category::Shopping);
        assert_eq!(categorize("租車 後 安排 路線"), Category::Planning);
    }

    #[test]
    fn extracts_month_and_day() {
        let badge = extract_date("03/15 出發").unwrap();
        assert_eq!(badge.month_label(Locale::ZhTw), "3月");
        assert_eq!(badge.day.to_string(), "15");
        assert_eq!(badge.label(Locale::ZhTw), "3月15日");
        assert_eq!(badge.label(Locale::En), "Mar 15");
    }

    #[rstest]
    #[case("13/05 不存在的月份")]
    #[case("00/10 也不行")]
    #[case("沒有日期")]
    #[case("3/15 只有一位數")]
    fn missing_or_malformed_dates_yield_no_badge(#[case] text: &str) {
        assert_eq!(extract_date(text), None);
    }

    #[rstest]
    #[case("購買 500 紐幣 保險", "500 NZD")]
    #[case("門票 35紐西蘭幣", "35 NZD")]
    #[case("購買 500 紐", "500 NZD")]
    fn extracts_price_with_fallback_patterns(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(extract_price(text).unwrap().label(), expected);
    }

    #[test]
    fn no_price_without_currency() {
        assert_eq!(extract_price("購買 500 元"), None);
    }

    #[test]
    fn annotate_combines_all_badges() {
        let annotation = annotate("02/20 購買 120 紐幣 門票");
        assert_eq!(annotation.category, Category::Shopping);
        assert_eq!(annotation.date, Some(DateBadge { month: 2, day: 20 }));
        assert_eq!(annotation.price.map(|p| p.label()).as_deref(), Some("120 NZD"));
    }

    #[rstest]
    #[case("攜帶轉接頭", "🎒")]
    #[case("安排接送", "📅")]
    #[case("確認航班", "✅")]
    #[case("預訂餐廳", "✅")]
    #[case("兌換紐幣", "💰")]
    #[case("看風景", "📝")]
    fn picks_activity_icon(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(activity_icon(text), expected);
    }

    #[test]
    fn splits_important_note() {
        assert_eq!(
            split_important_note("健行 注意:帶雨衣"),
            ("健行 ", Some("帶雨衣"))
        );
        assert_eq!(split_important_note("搭船"), ("搭船", None));
    }

    #[test]
    fn detects_link_sources() {
        let tr = Translations::builtin(Locale::En);
        assert_eq!(
            LinkSource::detect("https://www.booking.com/hotel/nz/x").label(&tr),
            "Booking.com"
        );
        assert_eq!(LinkSource::detect("https://goo.gl/maps/abc").label(&tr), "Google Maps");
        assert_eq!(LinkSource::detect("https://example.org").label(&tr), "Details");
    }
}
