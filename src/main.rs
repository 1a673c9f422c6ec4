// ==========================================
// 医院药品库存监控系统 - 命令行入口
// ==========================================
// 子命令: import / status / reorder / dashboard / alerts / trend
//         ask / export / config / batches / watch
// 全局参数: --db / --json / --lang / --log-json
// ==========================================

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

use hospital_stock::api::{ApiError, DashboardSnapshot, ImportApiResponse};
use hospital_stock::app::{get_default_db_path, AppState};
use hospital_stock::decision::{
    compute_kpis, DashboardFilter, DateRange, ExportKind, Heatmap, KpiSummary, StatusRefresher,
};
use hospital_stock::domain::{ReorderRecommendation, StockStatus};
use hospital_stock::i18n::{self, t, t_with_args};
use hospital_stock::logging;

#[derive(Parser)]
#[command(name = "hospital-stock", about = "医院药品库存监控: 状态分级与补货建议", version)]
struct Cli {
    #[arg(long, global = true, help = "数据库文件路径(默认: HOSPITAL_STOCK_DB_PATH 或用户数据目录)")]
    db: Option<String>,

    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "以 JSON 格式输出结果"
    )]
    json: bool,

    #[arg(long, global = true, help = "输出语言: zh-CN / en")]
    lang: Option<String>,

    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "日志以 JSON 格式写到 stderr"
    )]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 导入台账文件(.csv / .xlsx / .xls)
    Import(ImportArgs),
    /// 当前库存状态
    Status(FilterArgs),
    /// 补货建议
    Reorder(FilterArgs),
    /// 驾驶舱汇总
    Dashboard(FilterArgs),
    /// 告警摘要与断货预测
    Alerts(RangeArgs),
    /// 药品库存趋势
    Trend(TrendArgs),
    /// 库存问答
    Ask(AskArgs),
    /// 导出补货清单 / 库存明细 / 文本报告
    Export(ExportArgs),
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommands),
    /// 最近的导入批次
    Batches(BatchesArgs),
    /// 定时刷新库存状态,Ctrl-C 退出
    Watch(WatchArgs),
}

#[derive(Args)]
struct ImportArgs {
    #[arg(required = true, num_args = 1.., help = "台账文件路径")]
    files: Vec<PathBuf>,
    #[arg(long, action = ArgAction::SetTrue, help = "仅在库中没有台账时导入")]
    if_empty: bool,
}

#[derive(Args, Clone)]
struct FilterArgs {
    #[arg(long, help = "按药品名称过滤(精确匹配)")]
    medicine: Option<String>,
    #[arg(long, help = "按医院名称过滤(精确匹配)")]
    hospital: Option<String>,
    #[arg(long, default_value = "all", help = "日期范围: all / 7d / 30d / YYYY-MM-DD..YYYY-MM-DD")]
    range: DateRange,
}

impl FilterArgs {
    fn to_filter(&self) -> DashboardFilter {
        DashboardFilter {
            medicine: self.medicine.clone(),
            hospital: self.hospital.clone(),
            date_range: self.range,
        }
    }
}

#[derive(Args)]
struct RangeArgs {
    #[arg(long, default_value = "all", help = "日期范围: all / 7d / 30d / YYYY-MM-DD..YYYY-MM-DD")]
    range: DateRange,
}

#[derive(Args)]
struct TrendArgs {
    #[arg(help = "药品名称")]
    medicine: String,
    #[arg(long, default_value = "all")]
    range: DateRange,
}

#[derive(Args)]
struct AskArgs {
    #[arg(required = true, num_args = 1.., help = "问题,如 \"which medicines are critical\"")]
    question: Vec<String>,
}

#[derive(Args)]
struct ExportArgs {
    #[arg(help = "导出类型: reorder / inventory / report")]
    kind: ExportKind,
    #[arg(long, help = "输出文件路径(默认: <类型>_YYYYMMDD.<扩展名>)")]
    out: Option<PathBuf>,
    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// 列出全部配置项
    List,
    /// 设置配置项
    Set { key: String, value: String },
}

#[derive(Args)]
struct BatchesArgs {
    #[arg(long, default_value_t = 10)]
    limit: usize,
    #[arg(long, help = "查看单个批次(含 DQ 报告)")]
    id: Option<String>,
}

#[derive(Args)]
struct WatchArgs {
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(long, help = "刷新间隔(秒),默认读取 refresh_interval_secs")]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }
    if let Some(lang) = cli.lang.as_deref() {
        i18n::set_locale(lang);
    }

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!(db_path = %db_path, version = hospital_stock::VERSION, "{}", hospital_stock::APP_NAME);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match cli.command {
        Commands::Import(args) => handle_import(&state, args, cli.json).await?,
        Commands::Status(args) => handle_status(&state, &args, cli.json)?,
        Commands::Reorder(args) => handle_reorder(&state, &args, cli.json)?,
        Commands::Dashboard(args) => handle_dashboard(&state, &args, cli.json)?,
        Commands::Alerts(args) => handle_alerts(&state, args, cli.json)?,
        Commands::Trend(args) => handle_trend(&state, args, cli.json)?,
        Commands::Ask(args) => handle_ask(&state, args, cli.json)?,
        Commands::Export(args) => handle_export(&state, args, cli.json)?,
        Commands::Config(command) => handle_config(&state, command, cli.json)?,
        Commands::Batches(args) => handle_batches(&state, args, cli.json)?,
        Commands::Watch(args) => handle_watch(&state, args, cli.json).await?,
    }

    Ok(())
}

// ==========================================
// 子命令处理
// ==========================================

async fn handle_import(state: &AppState, args: ImportArgs, json: bool) -> Result<()> {
    let paths: Vec<String> = args
        .files
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect();

    if args.if_empty {
        // 只看第一个文件: 导入后库就不为空了
        let path = &paths[0];
        let response = state
            .import_api
            .import_if_empty(path)
            .await
            .with_context(|| format!("导入失败: {}", path))?;
        match response {
            Some(resp) => print_import(&resp, json)?,
            None if json => print_json(&serde_json::json!({ "skipped": true }))?,
            None => println!("{}", t("cli.import_skipped")),
        }
        return Ok(());
    }

    if paths.len() == 1 {
        let response = state
            .import_api
            .import_stock_file(&paths[0])
            .await
            .with_context(|| format!("导入失败: {}", paths[0]))?;
        return print_import(&response, json);
    }

    let results = state.import_api.import_stock_files(paths.clone()).await;
    let mut failed = 0;
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(resp) => print_import(&resp, json)?,
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", path, e);
            }
        }
    }
    if failed > 0 {
        return Err(anyhow!("{} 个文件导入失败", failed));
    }
    Ok(())
}

fn print_import(resp: &ImportApiResponse, json: bool) -> Result<()> {
    if json {
        return print_json(resp);
    }
    println!(
        "{}",
        t_with_args(
            "cli.import_done",
            &[
                ("batch", resp.batch_id.as_str()),
                ("imported", resp.imported.to_string().as_str()),
                ("blocked", resp.blocked.to_string().as_str()),
                ("conflicts", resp.conflicts.to_string().as_str()),
                ("warnings", resp.dq_summary.warning.to_string().as_str()),
                ("ms", resp.elapsed_ms.to_string().as_str()),
            ],
        )
    );
    for v in resp.dq_violations.iter().take(20) {
        println!("  [{:?}] row {} {}: {}", v.level, v.row_number, v.field, v.message);
    }
    if resp.dq_violations.len() > 20 {
        println!("  ... {}", resp.dq_violations.len() - 20);
    }
    Ok(())
}

fn handle_status(state: &AppState, args: &FilterArgs, json: bool) -> Result<()> {
    let statuses = state.dashboard_api.list_stock_status(&args.to_filter())?;
    if json {
        return print_json(&statuses);
    }
    print_status_table(&statuses);
    print_kpi(&compute_kpis(&statuses));
    Ok(())
}

fn handle_reorder(state: &AppState, args: &FilterArgs, json: bool) -> Result<()> {
    let recs = state.dashboard_api.list_reorder_recommendations(&args.to_filter())?;
    if json {
        return print_json(&recs);
    }
    if recs.is_empty() {
        println!("{}", t("cli.no_reorders"));
    } else {
        print_reorder_table(&recs);
    }
    Ok(())
}

fn handle_dashboard(state: &AppState, args: &FilterArgs, json: bool) -> Result<()> {
    let snapshot = state.dashboard_api.get_dashboard(&args.to_filter())?;
    if json {
        return print_json(&snapshot);
    }
    print_dashboard(&snapshot);
    Ok(())
}

fn handle_alerts(state: &AppState, args: RangeArgs, json: bool) -> Result<()> {
    let view = state.dashboard_api.get_alerts(args.range)?;
    if json {
        return print_json(&view);
    }
    println!("{}", view.summary.render());
    println!();
    println!("{}", view.forecast.render());
    Ok(())
}

fn handle_trend(state: &AppState, args: TrendArgs, json: bool) -> Result<()> {
    let series = state.dashboard_api.get_stock_trend(&args.medicine, args.range)?;
    if json {
        return print_json(&series);
    }
    if series.is_empty() {
        println!("{}", t_with_args("cli.no_trend", &[("medicine", args.medicine.as_str())]));
        return Ok(());
    }
    for s in &series {
        println!("{}", s.hospital_name);
        for p in &s.points {
            println!("  {}  {}", p.date, p.closing_stock);
        }
    }
    Ok(())
}

fn handle_ask(state: &AppState, args: AskArgs, json: bool) -> Result<()> {
    let question = args.question.join(" ");
    let answer = state.dashboard_api.ask(&question)?;
    if json {
        return print_json(&answer);
    }
    println!("{}", answer.render());
    Ok(())
}

fn handle_export(state: &AppState, args: ExportArgs, json: bool) -> Result<()> {
    let generated_at = chrono::Local::now().naive_local();
    let path = state.dashboard_api.export(
        args.kind,
        &args.filter.to_filter(),
        args.out.as_deref(),
        generated_at,
    )?;
    if json {
        return print_json(&serde_json::json!({ "kind": args.kind, "path": path }));
    }
    println!(
        "{}",
        t_with_args("cli.export_done", &[("path", path.display().to_string().as_str())])
    );
    Ok(())
}

fn handle_config(state: &AppState, command: ConfigCommands, json: bool) -> Result<()> {
    match command {
        ConfigCommands::List => {
            let items = state.config_api.list_configs()?;
            if json {
                return print_json(&items);
            }
            for item in items {
                let marker = if item.is_default { t("cli.config_default") } else { String::new() };
                println!("{:<24} {} {}", item.key, item.value, marker);
            }
        }
        ConfigCommands::Set { key, value } => {
            state.config_api.update_config(&key, &value)?;
            if json {
                return print_json(&state.config_api.get_config(&key)?);
            }
            println!(
                "{}",
                t_with_args("cli.config_updated", &[("key", key.as_str()), ("value", value.as_str())])
            );
        }
    }
    Ok(())
}

fn handle_batches(state: &AppState, args: BatchesArgs, json: bool) -> Result<()> {
    if let Some(batch_id) = args.id {
        let batch = state.import_api.get_import_batch(&batch_id)?;
        if json {
            return print_json(&batch);
        }
        println!(
            "{}  {}  {}/{}  blocked={} warning={} conflict={}  {}",
            batch.batch_id,
            batch.imported_at.map(|ts| ts.to_rfc3339()).unwrap_or_default(),
            batch.success_rows,
            batch.total_rows,
            batch.blocked_rows,
            batch.warning_rows,
            batch.conflict_rows,
            batch.file_name.unwrap_or_default()
        );
        if let Some(report) = batch.dq_report_json {
            println!("{}", report);
        }
        return Ok(());
    }

    let batches = state.import_api.list_import_batches(args.limit)?;
    if json {
        return print_json(&batches);
    }
    for b in batches {
        println!(
            "{}  {}  {}/{}  {}",
            b.batch_id,
            b.imported_at.map(|ts| ts.to_rfc3339()).unwrap_or_default(),
            b.success_rows,
            b.total_rows,
            b.file_name.unwrap_or_default()
        );
    }
    Ok(())
}

async fn handle_watch(state: &AppState, args: WatchArgs, json: bool) -> Result<()> {
    let interval = match args.interval {
        Some(secs) => secs,
        None => state.config_manager.load_dashboard_params()?.refresh_interval_secs,
    };
    let refresher = StatusRefresher::from_secs(interval);
    let filter = args.filter.to_filter();
    let api = state.dashboard_api.clone();

    println!("{}", t_with_args("cli.watch_started", &[("secs", interval.to_string().as_str())]));

    let ticks = refresher
        .run(
            || -> Result<(), ApiError> {
                let statuses = api.list_stock_status(&filter)?;
                let kpi = compute_kpis(&statuses);
                if json {
                    if let Ok(line) = serde_json::to_string(&kpi) {
                        println!("{}", line);
                    }
                } else {
                    println!("[{}]", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
                    print_kpi(&kpi);
                }
                Ok(())
            },
            async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "无法监听 Ctrl-C");
                    std::future::pending::<()>().await;
                }
            },
        )
        .await;

    println!("{}", t_with_args("cli.watch_stopped", &[("ticks", ticks.to_string().as_str())]));
    Ok(())
}

// ==========================================
// 输出
// ==========================================

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_kpi(kpi: &KpiSummary) {
    println!(
        "{}",
        t_with_args(
            "cli.kpi",
            &[
                ("total", kpi.total_items.to_string().as_str()),
                ("critical", kpi.critical.to_string().as_str()),
                ("warning", kpi.warning.to_string().as_str()),
                ("healthy", kpi.healthy.to_string().as_str()),
            ],
        )
    );
}

fn print_rows(headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| {
                let pad = w.saturating_sub(c.chars().count());
                format!("{}{}", c, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", line(headers).trim_end());
    for row in rows {
        println!("{}", line(row.as_slice()).trim_end());
    }
}

fn days_cell(days: Option<f64>) -> String {
    days.map(|d| format!("{:.1}", d)).unwrap_or_else(|| "-".to_string())
}

fn print_status_table(statuses: &[StockStatus]) {
    let headers: Vec<String> = [
        "table.hospital",
        "table.medicine",
        "table.current_stock",
        "table.min_level",
        "table.avg_daily_use",
        "table.days_left",
        "table.status",
    ]
    .iter()
    .map(|k| t(k))
    .collect();

    let rows: Vec<Vec<String>> = statuses
        .iter()
        .map(|s| {
            vec![
                s.hospital_name.clone(),
                s.medicine_name.clone(),
                s.current_stock.to_string(),
                s.min_stock_level.to_string(),
                format!("{:.2}", s.avg_daily_usage),
                days_cell(s.days_until_stockout_display()),
                s.stock_status.to_string(),
            ]
        })
        .collect();
    print_rows(&headers, &rows);
}

fn print_reorder_table(recs: &[ReorderRecommendation]) {
    let headers: Vec<String> = [
        "table.priority",
        "table.hospital",
        "table.medicine",
        "table.current_stock",
        "table.days_left",
        "table.recommended_order",
        "table.status",
    ]
    .iter()
    .map(|k| t(k))
    .collect();

    let rows: Vec<Vec<String>> = recs
        .iter()
        .map(|r| {
            vec![
                r.priority.to_string(),
                r.status.hospital_name.clone(),
                r.status.medicine_name.clone(),
                r.status.current_stock.to_string(),
                days_cell(r.status.days_until_stockout_display()),
                r.recommended_order_quantity.to_string(),
                r.status.stock_status.to_string(),
            ]
        })
        .collect();
    print_rows(&headers, &rows);
}

fn print_heatmap(heatmap: &Heatmap) {
    let mut headers = vec![t("table.medicine")];
    headers.extend(heatmap.hospitals.iter().cloned());
    let rows: Vec<Vec<String>> = heatmap
        .medicines
        .iter()
        .zip(&heatmap.cells)
        .map(|(m, cells)| {
            let mut row = vec![m.clone()];
            row.extend(
                cells
                    .iter()
                    .map(|c| c.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())),
            );
            row
        })
        .collect();
    print_rows(&headers, &rows);
}

fn print_dashboard(snapshot: &DashboardSnapshot) {
    println!("== {} ==", t("cli.section_overview"));
    print_kpi(&snapshot.kpi);
    for share in &snapshot.distribution {
        println!("  {:<9} {:>4}  {:>5.1}%", share.status.to_string(), share.count, share.percentage);
    }

    println!();
    println!("== {} ==", t("cli.section_heatmap"));
    print_heatmap(&snapshot.heatmap);

    println!();
    println!("== {} ==", t("cli.section_ranking"));
    for h in &snapshot.hospital_ranking {
        println!(
            "{}",
            t_with_args(
                "cli.ranking_item",
                &[
                    ("rank", h.rank.to_string().as_str()),
                    ("hospital", h.hospital_name.as_str()),
                    ("score", h.health_score.to_string().as_str()),
                    ("critical", h.critical.to_string().as_str()),
                ],
            )
        );
    }

    println!();
    println!("== {} ==", t("cli.section_impact"));
    let impact = &snapshot.impact;
    println!(
        "{}",
        t_with_args(
            "cli.impact",
            &[
                ("prevented", impact.stockouts_prevented.to_string().as_str()),
                ("savings", format!("{:.0}", impact.cost_savings).as_str()),
                ("patients", impact.patients_served.to_string().as_str()),
                ("waste", format!("{}", impact.waste_reduced_kg).as_str()),
            ],
        )
    );

    println!();
    println!("== {} ==", t("cli.section_alerts"));
    println!("{}", snapshot.alerts.render());
    println!();
    println!("{}", snapshot.forecast.render());

    println!();
    println!("== {} ==", t("cli.section_reorder"));
    if snapshot.recommendations.is_empty() {
        println!("{}", t("cli.no_reorders"));
    } else {
        print_reorder_table(&snapshot.recommendations);
    }
}
