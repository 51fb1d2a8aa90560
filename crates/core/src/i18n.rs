use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[serde(rename = "en")]
    En,
}

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::ZhTw => "zh-TW",
            Locale::En => "en",
        }
    }

    /// Resolve the locale from `LC_ALL` / `LANG`, falling back to `zh-TW`
    /// when neither is set.
    pub fn detect() -> Self {
        let value = std::env::var("LC_ALL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| std::env::var("LANG").ok());
        Self::from_env_value(value.as_deref())
    }

    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(raw) if raw.to_ascii_lowercase().starts_with("zh") => Locale::ZhTw,
            Some(raw) if !raw.trim().is_empty() && raw != "C" && raw != "POSIX" => Locale::En,
            _ => Locale::ZhTw,
        }
    }

    /// Month label used by date badges: `3月` or `Mar`.
    pub fn month_label(&self, month: u32) -> Option<String> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(match self {
            Locale::ZhTw => format!("{}月", month),
            Locale::En => MONTHS_SHORT[(month - 1) as usize].to_string(),
        })
    }

    pub fn not_available(&self) -> &'static str {
        "N/A"
    }

    pub fn date_format_error(&self) -> &'static str {
        match self {
            Locale::ZhTw => "日期格式錯誤",
            Locale::En => "Invalid date",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Locale::ZhTw => &["zh-TW", "zh", "zh-Hant"],
            Locale::En => &["en", "en-US"],
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase().replace('_', "-");
        match lower.as_str() {
            "zh" | "zh-tw" | "zh-hant" => Ok(Locale::ZhTw),
            other if other.starts_with("en") => Ok(Locale::En),
            other => Err(anyhow!("Unknown language '{}': expected zh-TW|en", other)),
        }
    }
}

impl ValueEnum for Locale {
    fn value_variants<'a>() -> &'a [Self] {
        &[Locale::ZhTw, Locale::En]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()).alias(match self {
            Locale::ZhTw => "zh",
            Locale::En => "en-US",
        }))
    }
}

/// Localized strings for one page build. Loaded once, read-only afterwards,
/// and passed to every renderer.
#[derive(Debug, Clone)]
pub struct Translations {
    locale: Locale,
    strings: HashMap<String, String>,
}

impl Translations {
    pub fn builtin(locale: Locale) -> Self {
        let table = match locale {
            Locale::ZhTw => ZH_TW,
            Locale::En => EN,
        };
        let strings = table
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self { locale, strings }
    }

    /// Overlay the entries of a `language.json` document on top of the
    /// built-in strings. Only string values are taken; a document without an
    /// entry for `locale` leaves the built-ins untouched.
    pub fn from_language_json(locale: Locale, json: &str) -> Result<Self, serde_json::Error> {
        let all: HashMap<String, HashMap<String, Value>> = serde_json::from_str(json)?;
        let mut translations = Self::builtin(locale);
        let entries = locale.aliases().iter().find_map(|tag| all.get(*tag));
        if let Some(entries) = entries {
            for (key, value) in entries {
                if let Value::String(text) = value {
                    translations.strings.insert(key.clone(), text.clone());
                }
            }
        }
        Ok(translations)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Look up `key`; unknown keys come back unchanged.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.strings.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn stage_title(&self, stage: u32, location: &str) -> String {
        match self.locale {
            Locale::ZhTw => format!("第{}階段：{}", stage, location),
            Locale::En => format!("Stage {}: {}", stage, location),
        }
    }

    pub fn total_days(&self, days: i64) -> String {
        match self.locale {
            Locale::ZhTw => format!("(共{}天)", days),
            Locale::En => format!("(total {} days)", days),
        }
    }

    pub fn task_count(&self, count: usize) -> String {
        match self.locale {
            Locale::ZhTw => format!("{} 個任務", count),
            Locale::En => format!("{} task{}", count, if count == 1 { "" } else { "s" }),
        }
    }

    pub fn nights(&self, nights: i64) -> String {
        match self.locale {
            Locale::ZhTw => format!("{}晚", nights),
            Locale::En => format!("{} night{}", nights, if nights == 1 { "" } else { "s" }),
        }
    }
}

const ZH_TW: &[(&str, &str)] = &[
    ("title", "旅行計畫"),
    ("flight", "航班資訊"),
    ("itinerary", "行程"),
    ("accommodation", "住宿"),
    ("task", "任務清單"),
    ("todo", "待辦事項"),
    ("day", "每日行程"),
    ("travelDates", "旅行日期："),
    ("flightNumber", "航班編號"),
    ("departure", "出發地"),
    ("destination", "目的地"),
    ("date", "日期"),
    ("departureTime", "起飛時間"),
    ("arrivalTime", "抵達時間"),
    ("flightDuration", "飛行時間"),
    ("outboundFlights", "去程航班"),
    ("inboundFlights", "回程航班"),
    ("transferAt", "轉機於"),
    ("loadHeaderError", "載入資料失敗"),
    ("loadFlightsError", "無法加載航班數據，請檢查網絡連接"),
    ("loadItineraryError", "無法加載行程數據，請稍後再試。"),
    ("loadAccommodationError", "載入住宿資料時發生錯誤"),
    ("loadTasksError", "載入任務數據失敗，請刷新頁面重試。"),
    ("loadTodoError", "載入待辦事項失敗，請刷新頁面重試。"),
    ("noTodo", "目前沒有待辦事項"),
    ("loadDayError", "載入失敗，請確認檔案是否存在"),
    ("missingDayId", "未指定行程 ID"),
    ("datesLabel", "日期："),
    ("relatedSite", "🌐 相關網站"),
    ("viewComments", "📝 查看備註"),
    ("notesHeading", "意見與備註"),
    ("showNotes", "展開意見"),
    ("editNotes", "編輯意見"),
    ("noNotes", "尚無意見"),
    ("loadNotesError", "載入意見失敗"),
    ("commentTitle", "行程備註"),
    ("commentLoadError", "無法載入備註內容，請稍後再試。"),
    ("close", "關閉"),
    ("choosePerson", "選擇人員"),
    ("noteContent", "意見內容"),
    ("notePlaceholder", "請輸入您的意見...（支援換行）"),
    ("cancel", "取消"),
    ("save", "保存"),
    ("saveNotesOk", "保存成功！"),
    ("saveNotesError", "保存失敗，請稍後重試"),
    ("confirmedHeading", "已確認入住"),
    ("canceledHeading", "待取消"),
    ("statusConfirmed", "已確認"),
    ("statusCanceled", "待取消"),
    ("bookingSource", "預訂來源："),
    ("stayType", "住宿類型："),
    ("address", "地址："),
    ("checkIn", "入住時間："),
    ("checkOut", "退房時間："),
    ("relatedLinks", "相關連結："),
    ("linkGoogleMaps", "Google 地圖"),
    ("linkDetails", "查看詳情"),
    ("stayOverview", "住宿時間軸"),
    ("categoryPlanning", "規劃"),
    ("categoryShopping", "購物"),
    ("categoryAccommodation", "住宿"),
    ("categoryTransportation", "交通"),
    ("categoryOther", "其他"),
    ("backToItinerary", "← 回行程表"),
    ("pros", "✅ 優點"),
    ("cons", "⚠️ 缺點"),
    ("analysisSuffix", " 分析"),
    ("waterTaxiTimetable", "📅 水上Taxi參考時間表"),
];

const EN: &[(&str, &str)] = &[
    ("title", "Trip Planner"),
    ("flight", "Flight Info"),
    ("itinerary", "Itinerary"),
    ("accommodation", "Accommodation"),
    ("task", "Tasks"),
    ("todo", "To-do"),
    ("day", "Day Plan"),
    ("travelDates", "Travel Dates: "),
    ("flightNumber", "Flight"),
    ("departure", "Departure"),
    ("destination", "Destination"),
    ("date", "Date"),
    ("departureTime", "Departure Time"),
    ("arrivalTime", "Arrival Time"),
    ("flightDuration", "Duration"),
    ("outboundFlights", "Outbound Flights"),
    ("inboundFlights", "Return Flights"),
    ("transferAt", "Transfer at"),
    ("loadHeaderError", "Failed to load trip data"),
    ("loadFlightsError", "Unable to load flight data, please check network connection"),
    ("loadItineraryError", "Unable to load itinerary data, please try again later."),
    ("loadAccommodationError", "Failed to load accommodation data"),
    ("loadTasksError", "Failed to load tasks, please reload the page."),
    ("loadTodoError", "Failed to load to-do items, please reload the page."),
    ("noTodo", "Nothing to do yet"),
    ("loadDayError", "Failed to load, please check that the file exists"),
    ("missingDayId", "No day id given"),
    ("datesLabel", "Dates: "),
    ("relatedSite", "🌐 Website"),
    ("viewComments", "📝 Notes"),
    ("notesHeading", "Comments"),
    ("showNotes", "Show comments"),
    ("editNotes", "Edit comments"),
    ("noNotes", "No comments yet"),
    ("loadNotesError", "Failed to load comments"),
    ("commentTitle", "Itinerary Notes"),
    ("commentLoadError", "Unable to load notes, please try again later."),
    ("close", "Close"),
    ("choosePerson", "Person"),
    ("noteContent", "Comment"),
    ("notePlaceholder", "Enter your comment... (line breaks supported)"),
    ("cancel", "Cancel"),
    ("save", "Save"),
    ("saveNotesOk", "Saved!"),
    ("saveNotesError", "Save failed, please try again"),
    ("confirmedHeading", "Confirmed"),
    ("canceledHeading", "To Cancel"),
    ("statusConfirmed", "Confirmed"),
    ("statusCanceled", "To cancel"),
    ("bookingSource", "Booked via: "),
    ("stayType", "Type: "),
    ("address", "Address: "),
    ("checkIn", "Check-in: "),
    ("checkOut", "Check-out: "),
    ("relatedLinks", "Links: "),
    ("linkGoogleMaps", "Google Maps"),
    ("linkDetails", "Details"),
    ("stayOverview", "Stay timeline"),
    ("categoryPlanning", "Planning"),
    ("categoryShopping", "Shopping"),
    ("categoryAccommodation", "Lodging"),
    ("categoryTransportation", "Transport"),
    ("categoryOther", "Other"),
    ("backToItinerary", "← Back to itinerary"),
    ("pros", "✅ Pros"),
    ("cons", "⚠️ Cons"),
    ("analysisSuffix", " analysis"),
    ("waterTaxiTimetable", "📅 Water taxi timetable"),
];
