use chrono::{Datelike, NaiveDate, Weekday};
use clap::ValueEnum;

use crate::models::{ChipTone, SessionBadge};

const THAI_MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

const THAI_MONTHS_SHORT: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.",
    "ธ.ค.",
];

// Sunday first, matching the grid's column order.
const THAI_WEEKDAYS: [&str; 7] = [
    "วันอาทิตย์",
    "วันจันทร์",
    "วันอังคาร",
    "วันพุธ",
    "วันพฤหัสบดี",
    "วันศุกร์",
    "วันเสาร์",
];

const THAI_WEEKDAYS_SHORT: [&str; 7] = ["อา", "จ", "อ", "พ", "พฤ", "ศ", "ส"];

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ENGLISH_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const ENGLISH_WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const BUDDHIST_ERA_OFFSET: i32 = 543;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Locale {
    #[default]
    #[value(name = "th")]
    Thai,
    #[value(name = "en")]
    English,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "th" | "th-th" | "thai" => Some(Locale::Thai),
            "en" | "en-us" | "en-gb" | "english" => Some(Locale::English),
            _ => None,
        }
    }

    /// `month` is 1-based.
    pub fn month_name(&self, month: u32) -> &'static str {
        let index = month.clamp(1, 12) as usize - 1;
        match self {
            Locale::Thai => THAI_MONTHS[index],
            Locale::English => ENGLISH_MONTHS[index],
        }
    }

    pub fn month_short(&self, month: u32) -> &'static str {
        let index = month.clamp(1, 12) as usize - 1;
        match self {
            Locale::Thai => THAI_MONTHS_SHORT[index],
            Locale::English => ENGLISH_MONTHS_SHORT[index],
        }
    }

    pub fn weekday_name(&self, weekday: Weekday) -> &'static str {
        let index = weekday.num_days_from_sunday() as usize;
        match self {
            Locale::Thai => THAI_WEEKDAYS[index],
            Locale::English => ENGLISH_WEEKDAYS[index],
        }
    }

    /// Column headers for the calendar grid, Sunday first.
    pub fn weekday_headers(&self) -> [&'static str; 7] {
        match self {
            Locale::Thai => THAI_WEEKDAYS_SHORT,
            Locale::English => ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
        }
    }

    pub fn display_year(&self, year: i32) -> i32 {
        match self {
            Locale::Thai => year + BUDDHIST_ERA_OFFSET,
            Locale::English => year,
        }
    }

    pub fn long_label(&self, date: NaiveDate) -> String {
        let weekday = self.weekday_name(date.weekday());
        let month = self.month_name(date.month());
        let year = self.display_year(date.year());
        match self {
            Locale::Thai => format!("{weekday}ที่ {} {month} พ.ศ. {year}", date.day()),
            Locale::English => format!("{weekday}, {month} {}, {year}", date.day()),
        }
    }

    pub fn short_label(&self, date: NaiveDate) -> String {
        let month = self.month_short(date.month());
        match self {
            Locale::Thai => format!("{} {month}", date.day()),
            Locale::English => format!("{month} {}", date.day()),
        }
    }

    pub fn month_heading(&self, year: i32, month: u32) -> String {
        format!("{} {}", self.month_name(month), self.display_year(year))
    }

    pub fn today_label(&self) -> &'static str {
        match self {
            Locale::Thai => "วันนี้",
            Locale::English => "Today",
        }
    }

    pub fn list_default_title(&self) -> &'static str {
        match self {
            Locale::Thai => "การฝึกซ้อม",
            Locale::English => "Training session",
        }
    }

    pub fn calendar_default_title(&self) -> &'static str {
        match self {
            Locale::Thai => "ฝึกซ้อม",
            Locale::English => "Training",
        }
    }

    pub fn badge_label(&self, badge: SessionBadge) -> &'static str {
        match (self, badge) {
            (Locale::Thai, SessionBadge::Present) => "เข้าร่วม",
            (Locale::Thai, SessionBadge::Absent) => "ขาด",
            (Locale::Thai, SessionBadge::Late) => "สาย",
            (Locale::Thai, SessionBadge::Today) => "วันนี้",
            (Locale::English, SessionBadge::Present) => "Present",
            (Locale::English, SessionBadge::Absent) => "Absent",
            (Locale::English, SessionBadge::Late) => "Late",
            (Locale::English, SessionBadge::Today) => "Today",
        }
    }

    pub fn legend_label(&self, tone: ChipTone) -> &'static str {
        match (self, tone) {
            (Locale::Thai, ChipTone::Attended) => "เข้าร่วมแล้ว",
            (Locale::Thai, ChipTone::Missed) => "ขาด",
            (Locale::Thai, ChipTone::Upcoming) => "กำลังจะมา",
            (Locale::Thai, ChipTone::Today) => "วันนี้",
            (Locale::English, ChipTone::Attended) => "Attended",
            (Locale::English, ChipTone::Missed) => "Absent",
            (Locale::English, ChipTone::Upcoming) => "Upcoming",
            (Locale::English, ChipTone::Today) => "Today",
        }
    }

    pub fn overflow_label(&self, count: usize) -> String {
        match self {
            Locale::Thai => format!("+{count} อื่นๆ"),
            Locale::English => format!("+{count} more"),
        }
    }

    pub fn coach_label(&self, name: &str) -> String {
        match self {
            Locale::Thai => format!("โค้ช {name}"),
            Locale::English => format!("Coach {name}"),
        }
    }

    pub fn not_loaded(&self) -> &'static str {
        match self {
            Locale::Thai => "กำลังโหลดตารางฝึกซ้อม...",
            Locale::English => "Loading schedule...",
        }
    }

    pub fn empty_schedule(&self) -> (&'static str, &'static str) {
        match self {
            Locale::Thai => ("ไม่มีตารางฝึกซ้อม", "ยังไม่มีการฝึกซ้อมที่กำหนดไว้"),
            Locale::English => ("No training schedule", "No sessions have been scheduled yet."),
        }
    }
}
