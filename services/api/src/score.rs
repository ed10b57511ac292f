use clap::Args;
use feature_intake::error::AppError;
use feature_intake::proposal::{RiceInputs, ScoreAssessment, ScoreScale};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Users affected per period
    #[arg(long)]
    pub(crate) reach: f64,
    /// Impact per user (3, 2, 1, 0.5 or 0.25 on the weighted scale)
    #[arg(long)]
    pub(crate) impact: f64,
    /// Confidence in the estimates (1.0, 0.8, 0.5 or 0.3 on the weighted scale)
    #[arg(long)]
    pub(crate) confidence: f64,
    /// Person-months of effort
    #[arg(long)]
    pub(crate) effort: f64,
    /// Scoring scale: weighted or slider
    #[arg(long, default_value = "weighted", value_parser = parse_scale)]
    pub(crate) scale: ScoreScale,
}

fn parse_scale(raw: &str) -> Result<ScoreScale, String> {
    ScoreScale::parse(raw).ok_or_else(|| format!("unknown scale '{raw}' (weighted|slider)"))
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let inputs = RiceInputs::new(args.reach, args.impact, args.confidence, args.effort);
    let assessment = args.scale.assess(inputs);

    for line in render_assessment(args.scale, inputs, &assessment) {
        println!("{line}");
    }
    Ok(())
}

fn render_assessment(
    scale: ScoreScale,
    inputs: RiceInputs,
    assessment: &ScoreAssessment,
) -> Vec<String> {
    let mut lines = vec![format!(
        "RICE = {} x {} x {} / {}",
        inputs.reach, inputs.impact, inputs.confidence, inputs.effort
    )];

    if !scale.offers_impact(inputs.impact) || !scale.offers_confidence(inputs.confidence) {
        lines.push("Note: impact or confidence is outside the values offered by the form".into());
    }

    match assessment.tier() {
        Some(tier) => lines.push(format!("Score: {} ({tier})", assessment.display_score())),
        None => lines.push("Score: unscored".to_string()),
    }
    lines.push(assessment.guidance().to_string());
    lines
}
