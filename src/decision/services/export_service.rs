// ==========================================
// 医院药品库存监控系统 - 导出服务
// ==========================================
// 补货清单 CSV / 库存明细 CSV / 文本报告
// 默认文件名: reorder_list_YYYYMMDD.csv
//             inventory_YYYYMMDD.csv
//             stock_report_YYYYMMDD.txt
// ==========================================

use crate::decision::use_cases::overview::compute_kpis;
use crate::domain::stock::{ReorderRecommendation, StockStatus};
use crate::i18n::{t, t_count, t_with_args};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

pub const REORDER_HEADERS: [&str; 7] = [
    "Hospital",
    "Medicine",
    "Current Stock",
    "Avg Daily Use",
    "Days Until Stockout",
    "Recommended Order",
    "Status",
];

pub const INVENTORY_HEADERS: [&str; 7] = [
    "Hospital",
    "Medicine",
    "Current Stock",
    "Min Level",
    "Avg Daily Use",
    "Lead Time (Days)",
    "Status",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("导出文件写入失败: {0}")]
    Io(#[from] io::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("未知导出类型: {0}")]
    UnknownKind(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Reorder,
    Inventory,
    Report,
}

impl ExportKind {
    fn file_prefix(&self) -> &'static str {
        match self {
            ExportKind::Reorder => "reorder_list",
            ExportKind::Inventory => "inventory",
            ExportKind::Report => "stock_report",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ExportKind::Reorder | ExportKind::Inventory => "csv",
            ExportKind::Report => "txt",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportKind::Reorder => "reorder",
            ExportKind::Inventory => "inventory",
            ExportKind::Report => "report",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ExportKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reorder" => Ok(ExportKind::Reorder),
            "inventory" => Ok(ExportKind::Inventory),
            "report" => Ok(ExportKind::Report),
            other => Err(ExportError::UnknownKind(other.to_string())),
        }
    }
}

/// 默认导出文件名,如 `reorder_list_20240201.csv`
pub fn default_file_name(kind: ExportKind, date: NaiveDate) -> String {
    format!(
        "{}_{}.{}",
        kind.file_prefix(),
        date.format("%Y%m%d"),
        kind.extension()
    )
}

fn reorder_row(rec: &ReorderRecommendation) -> [String; 7] {
    let s = &rec.status;
    [
        s.hospital_name.clone(),
        s.medicine_name.clone(),
        s.current_stock.to_string(),
        format!("{:.2}", s.avg_daily_usage),
        s.days_until_stockout_display()
            .map(|d| format!("{:.1}", d))
            .unwrap_or_default(),
        rec.recommended_order_quantity.to_string(),
        s.stock_status.to_db_str().to_string(),
    ]
}

fn inventory_row(s: &StockStatus) -> [String; 7] {
    [
        s.hospital_name.clone(),
        s.medicine_name.clone(),
        s.current_stock.to_string(),
        s.min_stock_level.to_string(),
        format!("{:.2}", s.avg_daily_usage),
        s.lead_time_days.to_string(),
        s.stock_status.to_db_str().to_string(),
    ]
}

/// 写出补货清单 CSV
pub fn write_reorder_csv<W: Write>(writer: W, recommendations: &[ReorderRecommendation]) -> ExportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(REORDER_HEADERS)?;
    for rec in recommendations {
        wtr.write_record(reorder_row(rec))?;
    }
    wtr.flush()?;
    Ok(())
}

/// 写出库存明细 CSV
pub fn write_inventory_csv<W: Write>(writer: W, statuses: &[StockStatus]) -> ExportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(INVENTORY_HEADERS)?;
    for s in statuses {
        wtr.write_record(inventory_row(s))?;
    }
    wtr.flush()?;
    Ok(())
}

/// 等宽文本表格(列宽取表头与单元格最大字符数)
fn render_table(headers: &[&str], rows: &[[String; 7]]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let fmt_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![fmt_line(headers.to_vec())];
    for row in rows {
        lines.push(fmt_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// 文本报告
///
/// 汇总基于全部状态,补货表基于传入的(可能已过滤的)补货建议
pub fn render_text_report(
    generated_at: NaiveDateTime,
    statuses: &[StockStatus],
    recommendations: &[ReorderRecommendation],
) -> String {
    let kpi = compute_kpis(statuses);
    let generated = generated_at.format("%Y-%m-%d %H:%M").to_string();

    let mut out = vec![
        t("report.title"),
        t_with_args("report.generated", &[("time", generated.as_str())]),
        String::new(),
        t("report.summary"),
        t_count("report.total_items", kpi.total_items),
        t_count("report.critical", kpi.critical),
        t_count("report.warning", kpi.warning),
        String::new(),
        t("report.recommendations"),
    ];

    if recommendations.is_empty() {
        out.push(t("report.no_reorders"));
    } else {
        let rows: Vec<[String; 7]> = recommendations.iter().map(reorder_row).collect();
        out.push(render_table(&REORDER_HEADERS, &rows));
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

// ==========================================
// ExportService - 写出到文件
// ==========================================

pub struct ExportService;

impl ExportService {
    /// 按类型写出到指定路径
    pub fn export_to_path(
        kind: ExportKind,
        path: &Path,
        generated_at: NaiveDateTime,
        statuses: &[StockStatus],
        recommendations: &[ReorderRecommendation],
    ) -> ExportResult<()> {
        let file = File::create(path)?;
        match kind {
            ExportKind::Reorder => write_reorder_csv(file, recommendations)?,
            ExportKind::Inventory => write_inventory_csv(file, statuses)?,
            ExportKind::Report => {
                let mut file = file;
                file.write_all(render_text_report(generated_at, statuses, recommendations).as_bytes())?;
            }
        }

        info!(
            kind = %kind,
            path = %path.display(),
            statuses = statuses.len(),
            recommendations = recommendations.len(),
            "导出完成"
        );
        Ok(())
    }
}
