// ==========================================
// 样例台账生成器
// ==========================================
// 用途: 生成 4 家医院 x 6 种药品 x 30 天的每日台账
// 输出: data/sample_data.csv(可通过第一个参数指定路径)
// 数据为确定性序列,重复运行结果一致
// ==========================================

use chrono::{Duration, NaiveDate};
use csv::Writer;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

// CSV 表头(与导入器标准列名一致)
const CSV_HEADER: &[&str] = &[
    "date",
    "hospital_id",
    "hospital_name",
    "medicine_name",
    "opening_stock",
    "received",
    "issued",
    "closing_stock",
    "lead_time_days",
    "min_stock_level",
];

const HOSPITALS: &[(&str, &str)] = &[
    ("H001", "City General Hospital"),
    ("H002", "St. Mary's Medical Center"),
    ("H003", "Riverside Clinic"),
    ("H004", "Northside Community Hospital"),
];

const MEDICINES: &[&str] = &[
    "Amoxicillin",
    "Insulin",
    "Paracetamol",
    "Ibuprofen",
    "Saline Solution",
    "Metformin",
];

const DAYS: i64 = 30;

// 单日台账
struct DailyRow {
    date: NaiveDate,
    hospital_id: &'static str,
    hospital_name: &'static str,
    medicine_name: &'static str,
    opening_stock: i64,
    received: i64,
    issued: i64,
    closing_stock: i64,
    lead_time_days: i64,
    min_stock_level: i64,
}

impl DailyRow {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.hospital_id.to_string(),
            self.hospital_name.to_string(),
            self.medicine_name.to_string(),
            self.opening_stock.to_string(),
            self.received.to_string(),
            self.issued.to_string(),
            self.closing_stock.to_string(),
            self.lead_time_days.to_string(),
            self.min_stock_level.to_string(),
        ]
    }
}

// 生成单条序列
//
// 按 (h + m) % 3 分三类:
// - 0: 不补货,期初按 33 天消耗备货,月末跌破最低库存
// - 1: 正常补货,库存低于 2 倍最低库存时补 4 倍
// - 2: 不补货,最低库存较低,月末剩余约一个交货期的用量
fn generate_series(h: usize, m: usize, start: NaiveDate) -> Vec<DailyRow> {
    let (hospital_id, hospital_name) = HOSPITALS[h];
    let base_usage = 3 + ((h * 7 + m * 5) % 12) as i64;
    let lead_time_days = 3 + ((h + m) % 5) as i64;
    let category = (h + m) % 3;

    let (min_stock_level, mut opening) = match category {
        2 => (base_usage * 2, base_usage * (DAYS + lead_time_days)),
        0 => (base_usage * 5, base_usage * (DAYS + 3)),
        _ => (base_usage * 5, base_usage * 15 + (m as i64) * 10),
    };
    let mut rows = Vec::with_capacity(DAYS as usize);

    for day in 0..DAYS {
        let jitter = ((day as usize * 13 + h * 3 + m * 7) % 5) as i64 - 2;
        let received = if category == 1 && opening < min_stock_level * 2 {
            min_stock_level * 4
        } else {
            0
        };
        let issued = (base_usage + jitter).max(0).min(opening + received);
        let closing = opening + received - issued;

        rows.push(DailyRow {
            date: start + Duration::days(day),
            hospital_id,
            hospital_name,
            medicine_name: MEDICINES[m],
            opening_stock: opening,
            received,
            issued,
            closing_stock: closing,
            lead_time_days,
            min_stock_level,
        });
        opening = closing;
    }

    rows
}

fn main() -> Result<(), Box<dyn Error>> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/sample_data.csv".to_string());
    println!("开始生成样例台账...");

    if let Some(parent) = Path::new(&output).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("起始日期非法")?;
    let mut wtr = Writer::from_writer(File::create(&output)?);
    wtr.write_record(CSV_HEADER)?;

    let mut count = 0;
    for h in 0..HOSPITALS.len() {
        for m in 0..MEDICINES.len() {
            for row in generate_series(h, m, start) {
                wtr.write_record(&row.to_row())?;
                count += 1;
            }
        }
    }

    wtr.flush()?;
    println!("✓ 生成 {} ({}条)", output, count);
    Ok(())
}
