//! Subcommand handlers. Each one calls the API and renders the result.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use futures::future::try_join;
use satwatch_core::api::ListQuery;
use satwatch_core::config::{Config, TokenStoreKind};
use satwatch_core::models::{
    analyze_anomalies, interpret_index, Alert, AlertStatus, Detection, EventLog, FinancialRisk,
    Image, Investigation, Page, SpectralIndex, ValidationStatus,
};
use satwatch_core::utils::{format_amount, format_date, format_optional, truncate_string};
use satwatch_core::ApiClient;
use serde_json::json;
use tracing::{debug, info};

use crate::output::{fmt_id, fmt_percent, fmt_score, print_fields, Output, Table, EMPTY};
use crate::{AlertFilter, Command, EventView, InvestigationFilter, StatsView};

/// Maximum width of free-text columns
const TEXT_COLUMN_WIDTH: usize = 48;

pub async fn dispatch(command: Command, client: &ApiClient, config: &Config, out: Output) -> Result<()> {
    debug!(?command, "Running command");
    match command {
        Command::Login { email } => login(client, config, email).await,
        Command::Logout => {
            client.logout();
            out.note("Logged out.");
            Ok(())
        }
        Command::Status => status(client, out).await,
        Command::Profile => profile(client, out).await,
        Command::Images { recent } => images(client, out, recent).await,
        Command::Analyze { months } => analyze(client, out, months).await,
        Command::Detections {
            high_confidence,
            status,
            page,
        } => detections(client, out, high_confidence, status, page).await,
        Command::Validate { id, status } => {
            let detection = client.validate_detection(id, status).await?;
            out.emit(&detection, |d| {
                println!("Detection {} is now {}", d.id, display_status(d));
            })
        }
        Command::Alerts { filter } => alerts(client, out, filter).await,
        Command::AlertStatus { id, status, assign } => {
            let alert = client.update_alert_status(id, status, assign).await?;
            out.emit(&alert, |a| {
                println!("Alert {} is now {}", a.id, a.alert_status);
                if let Some(ref agent) = a.assigned_to_name {
                    println!("Assigned to {}", agent);
                }
            })
        }
        Command::Investigations { filter } => investigations(client, out, filter).await,
        Command::Agents => agents(client, out).await,
        Command::Regions => regions(client, out).await,
        Command::Risks { high_impact } => risks(client, out, high_impact).await,
        Command::Events { view } => events(client, out, view).await,
        Command::Stats { view, days } => stats(client, out, view, days).await,
        Command::Spectral { image_id, reference } => spectral(client, out, image_id, reference).await,
        Command::Reports => reports(client, out).await,
    }
}

// ===== Session =====

async fn login(client: &ApiClient, config: &Config, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password(format!("Password for {}: ", email))
        .context("Failed to read password")?;

    let user = client.login(&email, &password).await?;
    println!("Logged in as {}", user.display_name());

    // Persist only the remembered email, not one-off flag overrides
    let mut saved = Config::load().unwrap_or_default();
    saved.last_email = Some(email);
    saved.save().context("Failed to save config")?;

    if config.token_store == TokenStoreKind::Memory {
        eprintln!("Note: tokens are kept in memory and will be forgotten when this command exits.");
    }
    info!(user_id = user.id, "Logged in");
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    let value = line.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("No email given");
    }
    Ok(value)
}

async fn status(client: &ApiClient, out: Output) -> Result<()> {
    if !client.is_authenticated() {
        return out.emit(
            &json!({"api_url": client.base_url(), "session": client.session_state().to_string()}),
            |_| {
                println!("API:     {}", client.base_url());
                println!("Session: not logged in (run `satwatch login`)");
            },
        );
    }

    let (profile, dashboard) = try_join(client.fetch_profile(), client.fetch_dashboard_stats()).await?;
    let summary = json!({
        "api_url": client.base_url(),
        "session": client.session_state().to_string(),
        "user": profile,
        "dashboard": dashboard,
    });
    out.emit(&summary, |_| {
        let name = profile.full_name.clone().unwrap_or_else(|| profile.email.clone());
        print_fields(&[
            ("API", client.base_url().to_string()),
            ("User", format!("{} <{}>", name, profile.email)),
            ("Role", format_optional(&profile.primary_authority, EMPTY)),
            ("Detections", dashboard.total_detections.to_string()),
            ("Active alerts", dashboard.active_alerts.to_string()),
            ("Pending investigations", dashboard.pending_investigations.to_string()),
            ("Financial risk", format!("{} FCFA", format_amount(dashboard.total_financial_risk))),
        ]);
    })
}

async fn profile(client: &ApiClient, out: Output) -> Result<()> {
    let profile = client.fetch_profile().await?;
    out.emit(&profile, |p| {
        let authorities: Vec<&str> = p.authorities.iter().map(|a| a.name()).collect();
        print_fields(&[
            ("Email", p.email.clone()),
            ("Name", format!("{} {}", p.first_name, p.last_name).trim().to_string()),
            ("Job title", format_optional(&p.job_title, EMPTY)),
            ("Institution", format_optional(&p.institution, EMPTY)),
            ("Region", format_optional(&p.authorized_region, EMPTY)),
            ("Authorities", authorities.join(", ")),
            ("Active", p.is_active.to_string()),
        ]);
    })
}

// ===== Imagery =====

async fn images(client: &ApiClient, out: Output, recent: bool) -> Result<()> {
    let page = if recent {
        client.fetch_recent_images().await?
    } else {
        client.fetch_images(&ListQuery::new().ordering("-capture_date")).await?
    };
    out.emit(&page, render_images)
}

fn render_images(page: &Page<Image>) {
    let mut table = Table::new(&["ID", "NAME", "CAPTURED", "STATUS", "REGION", "NDVI", "NDWI", "NDTI"]);
    for image in &page.results {
        table.row(vec![
            image.id.to_string(),
            truncate_string(&image.name, TEXT_COLUMN_WIDTH),
            image.capture_date.as_deref().map(format_date).unwrap_or_else(|| EMPTY.to_string()),
            image.processing_status.clone(),
            format_optional(&image.region_name, EMPTY),
            fmt_score(image.ndvi_mean),
            fmt_score(image.ndwi_mean),
            fmt_score(image.ndti_mean),
        ]);
    }
    table.print_or("No images.");
    print_page_footer(page);
}

async fn analyze(client: &ApiClient, out: Output, months: u32) -> Result<()> {
    out.note(&format!("Running analysis over the last {} months...", months));
    let run = client.run_analysis(months).await?;
    out.emit(&run, |r| {
        println!("{}", r.message);
        if let Some(ref data) = r.data {
            print_fields(&[
                ("Images processed", data.images_processed.to_string()),
                ("Detections found", data.detections_found.to_string()),
                ("Alerts generated", data.alerts_generated.to_string()),
                ("Investigations created", data.investigations_created.to_string()),
            ]);
        }
        for error in &r.errors {
            eprintln!("  error: {}", error);
        }
    })
}

// ===== Detections & alerts =====

async fn detections(
    client: &ApiClient,
    out: Output,
    high_confidence: bool,
    status: Option<ValidationStatus>,
    page: Option<u32>,
) -> Result<()> {
    let results = if high_confidence {
        client.fetch_high_confidence_detections().await?
    } else {
        let mut query = ListQuery::new().ordering("-detection_date");
        if let Some(status) = status {
            query = query.filter("validation_status", status.as_str());
        }
        if let Some(page) = page {
            query = query.page(page);
        }
        client.fetch_detections(&query).await?
    };
    out.emit(&results, render_detections)
}

fn display_status(detection: &Detection) -> String {
    detection
        .status()
        .map(|s| s.to_string())
        .unwrap_or_else(|| detection.validation_status.clone())
}

fn render_detections(page: &Page<Detection>) {
    let mut table = Table::new(&["ID", "TYPE", "CONF", "STATUS", "REGION", "DETECTED", "LOCATION"]);
    for d in &page.results {
        table.row(vec![
            d.id.to_string(),
            d.kind().to_string(),
            fmt_percent(d.confidence_score),
            display_status(d),
            format_optional(&d.region_name, EMPTY),
            d.detection_date.as_deref().map(format_date).unwrap_or_else(|| EMPTY.to_string()),
            d.coordinates().unwrap_or_else(|| EMPTY.to_string()),
        ]);
    }
    table.print_or("No detections.");
    print_page_footer(page);
}

async fn alerts(client: &ApiClient, out: Output, filter: AlertFilter) -> Result<()> {
    let mut page = match filter {
        AlertFilter { active: true, .. } => client.fetch_active_alerts().await?,
        AlertFilter { critical: true, .. } => client.fetch_critical_alerts().await?,
        _ => client.fetch_alerts(&ListQuery::new()).await?,
    };
    page.results.sort_by(|a, b| b.level().cmp(&a.level()));
    out.emit(&page, render_alerts)
}

fn render_alerts(page: &Page<Alert>) {
    let mut table = Table::new(&["ID", "LEVEL", "STATUS", "REGION", "ASSIGNED", "MESSAGE"]);
    for alert in &page.results {
        let status = alert
            .status()
            .map(|s: AlertStatus| s.to_string())
            .unwrap_or_else(|| alert.alert_status.clone());
        table.row(vec![
            alert.id.to_string(),
            alert.level().to_string(),
            status,
            format_optional(&alert.region_name, EMPTY),
            format_optional(&alert.assigned_to_name, EMPTY),
            truncate_string(&alert.message, TEXT_COLUMN_WIDTH),
        ]);
    }
    table.print_or("No alerts.");
    print_page_footer(page);
}

// ===== Investigations =====

async fn investigations(client: &ApiClient, out: Output, filter: InvestigationFilter) -> Result<()> {
    let page = match filter {
        InvestigationFilter { pending: true, .. } => client.fetch_pending_investigations().await?,
        InvestigationFilter { mine: true, .. } => client.fetch_my_investigations().await?,
        _ => client.fetch_investigations(&ListQuery::new()).await?,
    };
    out.emit(&page, render_investigations)
}

fn render_investigations(page: &Page<Investigation>) {
    let mut table = Table::new(&["ID", "STATUS", "RESULT", "AGENT", "TARGET", "DATE"]);
    for inv in &page.results {
        table.row(vec![
            inv.id.to_string(),
            inv.status_label().to_string(),
            inv.result_display
                .clone()
                .or_else(|| inv.result.clone())
                .unwrap_or_else(|| EMPTY.to_string()),
            format_optional(&inv.assigned_to_name, EMPTY),
            format_optional(&inv.target_coordinates, EMPTY),
            inv.investigation_date
                .as_deref()
                .or(inv.created_at.as_deref())
                .map(format_date)
                .unwrap_or_else(|| EMPTY.to_string()),
        ]);
    }
    table.print_or("No investigations.");
    print_page_footer(page);
}

async fn agents(client: &ApiClient, out: Output) -> Result<()> {
    let availability = client.fetch_available_agents().await?;
    out.emit(&availability, |a| {
        let mut table = Table::new(&["ID", "NAME", "AVAILABILITY", "ACTIVE", "PENDING", "LOAD"]);
        for agent in &a.agents {
            table.row(vec![
                agent.id.to_string(),
                agent.full_name.clone(),
                agent.availability_status.clone(),
                agent.active_investigations_count.to_string(),
                agent.pending_investigations_count.to_string(),
                agent.total_workload.to_string(),
            ]);
        }
        table.print_or("No field agents.");
        println!(
            "\n{} agents: {} available, {} busy, {} overloaded",
            a.summary.total_agents, a.summary.available_agents, a.summary.busy_agents, a.summary.overloaded_agents
        );
    })
}

// ===== Regions, risks, events =====

async fn regions(client: &ApiClient, out: Output) -> Result<()> {
    let regions = client.fetch_regions().await?;
    out.emit(&regions, |regions| {
        let mut table = Table::new(&["ID", "NAME", "CODE", "AREA (km2)", "PROTECTED ZONES"]);
        for region in regions {
            table.row(vec![
                region.id.to_string(),
                region.name.clone(),
                format_optional(&region.code, EMPTY),
                region.area_km2.map(format_amount).unwrap_or_else(|| EMPTY.to_string()),
                region.protected_zones.len().to_string(),
            ]);
        }
        table.print_or("No regions.");
    })
}

async fn risks(client: &ApiClient, out: Output, high_impact: bool) -> Result<()> {
    if high_impact {
        let risks = client.fetch_high_impact_risks().await?;
        return out.emit(&risks, |r| {
            render_risks(&r.results);
            println!(
                "\n{} high-impact risks, {} FCFA estimated loss",
                r.count,
                format_amount(r.total_estimated_loss)
            );
        });
    }
    let page = client
        .fetch_financial_risks(&ListQuery::new().ordering("-estimated_loss"))
        .await?;
    out.emit(&page, |p| {
        render_risks(&p.results);
        print_page_footer(p);
    })
}

fn render_risks(risks: &[FinancialRisk]) {
    let mut table = Table::new(&["ID", "LEVEL", "AREA (ha)", "LOSS (FCFA)", "DETECTION"]);
    for risk in risks {
        table.row(vec![
            risk.id.to_string(),
            risk.level().to_string(),
            format!("{:.2}", risk.area_hectares),
            format_amount(risk.estimated_loss),
            fmt_id(risk.detection),
        ]);
    }
    table.print_or("No financial risks.");
}

async fn events(client: &ApiClient, out: Output, view: EventView) -> Result<()> {
    match view {
        EventView { by_type: true, .. } => {
            let counts = client.fetch_events_by_type().await?;
            out.emit(&counts, |c| {
                let mut table = Table::new(&["TYPE", "COUNT"]);
                for entry in &c.by_type {
                    table.row(vec![
                        entry.label.clone().unwrap_or_else(|| entry.event_type.clone()),
                        entry.count.to_string(),
                    ]);
                }
                table.print_or("No events.");
                println!("\n{} events in total", c.total_events);
            })
        }
        EventView { recent: true, .. } => {
            let recent = client.fetch_recent_events().await?;
            out.emit(&recent, |r| render_events(&r.results))
        }
        _ => {
            let page = client.fetch_event_logs(&ListQuery::new()).await?;
            out.emit(&page, |p| {
                render_events(&p.results);
                print_page_footer(p);
            })
        }
    }
}

fn render_events(events: &[EventLog]) {
    let mut table = Table::new(&["WHEN", "TYPE", "USER", "MESSAGE"]);
    for event in events {
        table.row(vec![
            event
                .time_since
                .clone()
                .or_else(|| event.created_at.as_deref().map(format_date))
                .unwrap_or_else(|| EMPTY.to_string()),
            event.label().to_string(),
            format_optional(&event.user_name, EMPTY),
            truncate_string(&event.message, TEXT_COLUMN_WIDTH),
        ]);
    }
    table.print_or("No events.");
}

// ===== Statistics =====

async fn stats(client: &ApiClient, out: Output, view: StatsView, days: Option<u32>) -> Result<()> {
    match view {
        StatsView::Dashboard => {
            let stats = client.fetch_dashboard_stats().await?;
            out.emit(&stats, |s| {
                print_fields(&[
                    ("Detections", s.total_detections.to_string()),
                    ("High confidence", s.high_confidence_detections.to_string()),
                    ("Active alerts", s.active_alerts.to_string()),
                    ("Pending investigations", s.pending_investigations.to_string()),
                    ("Financial risk", format!("{} FCFA", format_amount(s.total_financial_risk))),
                    ("Accuracy", format!("{:.1}%", s.accuracy_rate)),
                    (
                        "Last analysis",
                        s.last_analysis_date.as_deref().map(format_date).unwrap_or_else(|| EMPTY.to_string()),
                    ),
                ]);
                let mut levels = Table::new(&["LEVEL", "ALERTS"]);
                for (level, count) in s.alerts_by_level_sorted() {
                    levels.row(vec![level.to_string(), count.to_string()]);
                }
                if !levels.is_empty() {
                    println!();
                    print!("{}", levels.render());
                }
            })
        }
        StatsView::Summary => {
            let summary = client.fetch_executive_summary().await?;
            out.emit(&summary, |s| {
                if let Some(ref period) = s.period {
                    println!("Period: {}\n", period);
                }
                let m = &s.key_metrics;
                print_fields(&[
                    ("Detections", m.total_detections.to_string()),
                    ("Critical situations", m.critical_situations.to_string()),
                    ("Estimated impact", format!("{} FCFA", format_amount(m.estimated_financial_impact_fcfa))),
                    ("System accuracy", format!("{:.1}%", m.system_accuracy_percent)),
                    ("Field investigations", m.active_field_investigations.to_string()),
                ]);
                print_list("Recommendations", &s.recommendations);
                print_list("Next actions", &s.next_actions);
            })
        }
        StatsView::Trends => {
            let trends = client.fetch_detection_trends(days).await?;
            out.emit(&trends, |t| {
                let mut table = Table::new(&["DAY", "DETECTIONS"]);
                for day in &t.daily_detections {
                    table.row(vec![format_date(&day.day), day.count.to_string()]);
                }
                table.print_or("No detections in this period.");
                println!(
                    "\n{} detections over {} days, {} high confidence",
                    t.total(),
                    t.period_days,
                    t.high_confidence_count
                );
                if let Some(ref analysis) = t.trend_analysis {
                    println!("Trend: {}", analysis);
                }
            })
        }
        StatsView::Financial => {
            let impact = client.fetch_financial_impact().await?;
            out.emit(&impact, |i| {
                print_fields(&[
                    ("Estimated loss", format!("{} FCFA", format_amount(i.total_estimated_loss_fcfa))),
                    ("Affected area", format!("{:.2} ha", i.total_affected_area_hectares)),
                    ("Cost per hectare", format!("{} FCFA", format_amount(i.average_cost_per_hectare_fcfa))),
                    (
                        "Share of national estimate",
                        format!("{:.2}%", i.economic_context.our_detection_percentage),
                    ),
                ]);
                let mut table = Table::new(&["RISK", "COUNT", "TOTAL (FCFA)", "AVERAGE (FCFA)"]);
                for row in &i.breakdown_by_risk_level {
                    table.row(vec![
                        row.risk_level.clone(),
                        row.count.to_string(),
                        format_amount(row.total_amount),
                        format_amount(row.avg_amount),
                    ]);
                }
                if !table.is_empty() {
                    println!();
                    print!("{}", table.render());
                }
            })
        }
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{}:", title);
    for item in items {
        println!("  - {}", item);
    }
}

// ===== Spectral =====

async fn spectral(client: &ApiClient, out: Output, image_id: i64, reference: Option<i64>) -> Result<()> {
    let reference_fetch = async {
        match reference {
            Some(id) => client.fetch_spectral_indices(id).await.map(Some),
            None => Ok(None),
        }
    };
    let (current, reference) = try_join(client.fetch_spectral_indices(image_id), reference_fetch).await?;
    let assessment = analyze_anomalies(&current, reference.as_ref());

    let readings: Vec<_> = SpectralIndex::ALL
        .iter()
        .map(|&index| {
            let value = current.mean(index);
            (index, value, interpret_index(value, index))
        })
        .collect();

    let report = json!({
        "image_id": current.image_id,
        "reference_image_id": reference.as_ref().map(|r| r.image_id),
        "indices": readings
            .iter()
            .map(|(index, value, reading)| json!({
                "index": index.to_string(),
                "mean": value,
                "status": reading.status,
                "description": reading.description,
            }))
            .collect::<Vec<_>>(),
        "anomaly": {
            "ndvi": assessment.ndvi_anomaly,
            "ndwi": assessment.ndwi_anomaly,
            "ndti": assessment.ndti_anomaly,
            "score": assessment.anomaly_score,
            "risk": assessment.overall_risk.to_string(),
        },
    });

    out.emit(&report, |_| {
        let mut table = Table::new(&["INDEX", "MEAN", "STATUS", "READING"]);
        for (index, value, reading) in &readings {
            table.row(vec![
                index.to_string(),
                format!("{:.3}", value),
                reading.status.to_string(),
                reading.description.to_string(),
            ]);
        }
        print!("{}", table.render());
        if let Some(ref reference) = reference {
            println!(
                "\nCompared with image {}: score {:.3}, risk {}",
                reference.image_id, assessment.anomaly_score, assessment.overall_risk
            );
        }
    })
}

// ===== Reports =====

async fn reports(client: &ApiClient, out: Output) -> Result<()> {
    let page = client.fetch_reports(&ListQuery::new().ordering("-created_at")).await?;
    out.emit(&page, |p| {
        let mut table = Table::new(&["ID", "NAME", "TYPE", "STATUS", "CREATED", "DOWNLOAD"]);
        for report in &p.results {
            table.row(vec![
                report.id.to_string(),
                truncate_string(&report.name, TEXT_COLUMN_WIDTH),
                report
                    .report_type_display
                    .clone()
                    .unwrap_or_else(|| report.report_type.clone()),
                format_optional(&report.status_display, EMPTY),
                report.created_at.as_deref().map(format_date).unwrap_or_else(|| EMPTY.to_string()),
                report.download_url().unwrap_or(EMPTY).to_string(),
            ]);
        }
        table.print_or("No reports.");
        print_page_footer(p);
    })
}

fn print_page_footer<T>(page: &Page<T>) {
    if page.has_next() {
        println!("\nShowing {} of {}", page.len(), page.count);
    }
}
