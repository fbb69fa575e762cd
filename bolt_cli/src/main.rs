//! # Bolted Joint Analysis CLI
//!
//! Runs every joint of a project file through the analysis engine and
//! prints a margin summary (or JSON for scripting).
//!
//! ```text
//! bolt_cli analyze job.bjp [--db <dir>] [--json]
//! bolt_cli template job.bjp
//! bolt_cli catalog [--db <dir>]
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;

use bolt_core::joint::JointSpec;
use bolt_core::{analyze, load_project, project_catalog, save_project, Analysis, BoltError, Catalog, Project};

fn main() -> ExitCode {
    let matches = cli().get_matches();

    let outcome = match matches.subcommand() {
        Some(("analyze", sub)) => run_analyze(sub),
        Some(("template", sub)) => run_template(sub),
        Some(("catalog", sub)) => run_catalog(sub),
        _ => Ok(true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn cli() -> Command {
    Command::new("bolt_cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Bolted joint analysis per ESA PSS-03-208 and ECSS-E-HB-32-23A")
        .subcommand_required(true)
        .subcommand(
            Command::new("analyze")
                .about("Analyze every joint of a project file")
                .arg(
                    Arg::new("project")
                        .required(true)
                        .value_name("PROJECT")
                        .value_parser(value_parser!(PathBuf))
                        .help("Project file (.bjp)"),
                )
                .arg(db_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the results as JSON"),
                ),
        )
        .subcommand(
            Command::new("template")
                .about("Write a sample project file")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_name("PATH")
                        .value_parser(value_parser!(PathBuf))
                        .help("Where to write the project"),
                ),
        )
        .subcommand(
            Command::new("catalog")
                .about("List the available bolts, washers and materials")
                .arg(db_arg()),
        )
}

fn db_arg() -> Arg {
    Arg::new("db")
        .long("db")
        .value_name("DIR")
        .help("Directory with bolts.toml / washers.toml / materials.toml overriding the built-in catalog")
}

fn catalog_for(sub: &ArgMatches, project: Option<(&Project, &Path)>) -> Result<Catalog, BoltError> {
    match (sub.get_one::<String>("db"), project) {
        (Some(dir), _) => Catalog::with_overrides(Path::new(dir)),
        (None, Some((project, path))) => project_catalog(project, path),
        (None, None) => Ok(Catalog::builtin()?.clone()),
    }
}

/// One joint of a JSON report.
#[derive(Serialize)]
struct JointReport<'a> {
    id: String,
    label: &'a str,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Analysis(Analysis),
    Error(BoltError),
}

/// Returns Ok(false) if any joint failed to analyze.
fn run_analyze(sub: &ArgMatches) -> Result<bool, BoltError> {
    let path = sub.get_one::<PathBuf>("project").expect("required");
    let project = load_project(path)?;
    let catalog = catalog_for(sub, Some((&project, path.as_path())))?;

    let reports: Vec<JointReport<'_>> = project
        .joints_by_label()
        .into_iter()
        .map(|(id, joint)| JointReport {
            id: id.to_string(),
            label: &joint.label,
            outcome: match analyze(joint, &catalog) {
                Ok(analysis) => Outcome::Analysis(analysis),
                Err(e) => Outcome::Error(e),
            },
        })
        .collect();
    let all_ok = reports.iter().all(|r| matches!(r.outcome, Outcome::Analysis(_)));

    if sub.get_flag("json") {
        let json = serde_json::to_string_pretty(&reports).map_err(|e| BoltError::serialization(e.to_string()))?;
        println!("{}", json);
        return Ok(all_ok);
    }

    println!("Project {} ({}), engineer {}", project.meta.job_id, project.meta.client, project.meta.engineer);
    println!("{} joint(s)", reports.len());
    for report in &reports {
        println!();
        match &report.outcome {
            Outcome::Analysis(analysis) => print_analysis(analysis),
            Outcome::Error(e) => {
                println!("═══════════════════════════════════════");
                println!("  {}", report.label);
                println!("═══════════════════════════════════════");
                report_error(e);
            }
        }
    }
    Ok(all_ok)
}

fn print_analysis(analysis: &Analysis) {
    let r = &analysis.results;
    println!("═══════════════════════════════════════");
    println!("  {} ({}, {})", r.label, r.method.display_name(), r.joint_type);
    println!("═══════════════════════════════════════");
    println!("Stiffness:");
    println!("  l_K   = {:.2} mm, A_sub = {:.1} mm²", r.clamp_length_mm, r.substitution_area_mm2);
    println!(
        "  δ_b   = {:.3e} mm/N, δ_c = {:.3e} mm/N",
        r.bolt_compliance_mm_per_n, r.clamped_compliance_mm_per_n
    );
    println!("  Φ     = {:.4}, Φn = {:.4}", r.force_ratio, r.force_ratio_n);
    println!("Preload:");
    println!("  T     = {} Nm (M_p = {} Nm)", r.tightening_torque_nm, r.prevailing_torque_nm);
    println!("  F_M   = {} N, α_A = {:.3}", r.assembly_preload_n, r.tightening_factor);
    println!("  F_Z   = {:.1} N (f_Z = {:.2} µm)", r.embedding_preload_n, r.embedding_depth_um);
    println!("  ΔF_th = {} N", r.thermal_preload_n);
    println!("  F_V   = {} N", r.service_preload_n);
    println!("Stresses after tightening:");
    println!("  τ     = {} MPa, σ_n = {} MPa", r.torsion_stress_mpa, r.axial_stress_mpa);
    println!("  σ_v   = {} MPa, ν = {}", r.von_mises_stress_mpa, r.utilization);
    println!("Margins:");
    println!("  pressure    {:>10} {}", r.mos_pressure.to_string(), status_icon(r.mos_pressure.passes()));
    println!("  global slip {:>10} {}", r.mos_global_slip.to_string(), status_icon(r.mos_global_slip.passes()));
    println!(
        "  {:<12} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "case", "slip", "gap", "yield", "ultimate", "bearing"
    );
    for lc in &r.load_cases {
        println!(
            "  {:<12} {:>10} {:>10} {:>10} {:>10} {:>10}{}",
            lc.id,
            lc.mos_slip.to_string(),
            lc.mos_gap.to_string(),
            lc.mos_yield.to_string(),
            lc.mos_ultimate.to_string(),
            lc.mos_bearing.to_string(),
            if lc.gapping { "  (gapping)" } else { "" }
        );
    }
    let s = &r.summary;
    println!(
        "  {:<12} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "minimum",
        s.mos_slip.to_string(),
        s.mos_gap.to_string(),
        s.mos_yield.to_string(),
        s.mos_ultimate.to_string(),
        s.mos_bearing.to_string()
    );
    if !analysis.diagnostics.is_empty() {
        println!("Notes:");
        for note in &analysis.diagnostics {
            println!("  {}", note);
        }
    }
    let (name, margin) = r.governing_margin();
    println!(
        "RESULT: {} (governs: {} {})",
        if r.passes() { "PASS" } else { "FAIL" },
        name,
        margin
    );
}

fn run_template(sub: &ArgMatches) -> Result<bool, BoltError> {
    let path = sub.get_one::<PathBuf>("path").expect("required");
    let mut project = Project::new("", "", "");
    let joint = JointSpec::template("J-1", &project.settings);
    project.add_joint(joint);
    save_project(&project, path)?;
    println!("Wrote sample project to {}", path.display());
    Ok(true)
}

fn run_catalog(sub: &ArgMatches) -> Result<bool, BoltError> {
    let catalog = catalog_for(sub, None)?;

    println!("Bolts ({}):", catalog.bolts.len());
    for (id, b) in catalog.bolts.iter() {
        println!(
            "  {:<10} d = {:>5.1} mm, p = {:.2} mm, As = {:>6.1} mm², dh = {:>5.1} mm",
            id, b.d_mm, b.p_mm, b.as_mm2, b.dh_mm
        );
    }
    println!("Washers ({}):", catalog.washers.len());
    for (id, w) in catalog.washers.iter() {
        println!("  {:<10} {:.1} / {:.1} mm, h = {:.1} mm", id, w.dmin_mm, w.dmaj_mm, w.h_mm);
    }
    println!("Materials ({}):", catalog.materials.len());
    for (id, m) in catalog.materials.iter() {
        println!(
            "  {:<20} E = {:>6.0} MPa, σ_y = {:>5.0} MPa, σ_u = {:>5.0} MPa, α = {:.2e} 1/K",
            id, m.e_mpa, m.sig_y_mpa, m.sig_u_mpa, m.alpha_per_k
        );
    }
    Ok(true)
}

fn report_error(e: &BoltError) {
    eprintln!("Error: {}", e);
    if let Ok(json) = serde_json::to_string_pretty(e) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}

fn status_icon(pass: bool) -> &'static str {
    if pass {
        "[OK]"
    } else {
        "[FAIL]"
    }
}
