use std::path::PathBuf;
use std::process::ExitCode;

use pagescope_lib::{
    AnalyzeOutput, BrowserManager, BrowserOptions, PageAnalyzer, PageScopeError, PageScopeOutput,
};

use crate::cli::AnalyzeArgs;
use crate::formatting::{exit_code_for_analysis, render_error, write_output};
use crate::settings::{
    apply_analyze_overrides, format_effective_config, load_config, AnalyzeFlagSources,
};

/// Run the analyze command.
pub async fn run_analyze(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    args: AnalyzeArgs,
) -> ExitCode {
    let format = args.format;
    let output = args.output.clone();

    let mut config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    let flags = AnalyzeFlagSources::from_args(raw_args);
    if let Err(err) = apply_analyze_overrides(&mut config, &args, &flags) {
        return render_error(err, format, output);
    }
    log::debug!("{}", format_effective_config(&config, config_path.as_deref()));

    let manager = BrowserManager::new(BrowserOptions::from(&config));
    let analyzer = match PageAnalyzer::new(manager, &config) {
        Ok(analyzer) => analyzer,
        Err(err) => return render_error(err, format, output),
    };

    let report = match analyzer.analyze(&args.url).await {
        Ok(report) => report,
        Err(err) => return render_error(err, format, output),
    };

    let broken = report.broken_links.len();
    let body = PageScopeOutput::Analyze(AnalyzeOutput::new(args.url, report));
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(PageScopeError::Config(err.to_string()), format, output);
    }
    exit_code_for_analysis(broken, args.fail_on_broken_links)
}
