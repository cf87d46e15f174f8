use crate::infra::analysis_pipeline;
use clap::Args;
use mbti_insight::config::AppConfig;
use mbti_insight::error::AppError;
use mbti_insight::telemetry;
use mbti_insight::workflows::analysis::{AnalysisOptions, AnalysisOutcome, AnalysisProfile};
use mbti_insight::workflows::questionnaire::{
    score_detailed, Answer, MbtiResult, QuestionCatalog, SessionError, SessionStep, TestSession,
    Variant, LIKERT_MAX, LIKERT_MIN,
};
use std::io::{self, BufRead, Write};

#[derive(Args, Debug)]
pub(crate) struct QuizArgs {
    /// Question set to use: short, standard, or extended
    #[arg(long, default_value = "short")]
    pub(crate) variant: String,
    /// Comma-separated answers (1-5, empty for unanswered) instead of prompting on stdin
    #[arg(long)]
    pub(crate) answers: Option<String>,
    /// Skip the remote provider and print the built-in analysis
    #[arg(long)]
    pub(crate) offline: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Four-letter type code, e.g. INTJ
    pub(crate) code: String,
    /// Model to request instead of the configured default
    #[arg(long)]
    pub(crate) model: Option<String>,
    /// Use the shorter completion budget
    #[arg(long)]
    pub(crate) long_context: bool,
    /// Skip the remote provider and print the built-in analysis
    #[arg(long)]
    pub(crate) offline: bool,
}

pub(crate) async fn run_quiz(args: QuizArgs) -> Result<(), AppError> {
    let QuizArgs {
        variant,
        answers,
        offline,
    } = args;

    let config = load_cli_config()?;
    let catalog = QuestionCatalog::load(config.catalog_path.as_deref())?;
    let variant = Variant::parse(&variant)
        .ok_or_else(|| AppError::Input(format!("unknown questionnaire variant '{variant}'")))?;
    let mut session = TestSession::start(&catalog, variant)?;

    println!("=== MBTI {} ({} questions) ===", variant.label(), session.questions().len());

    let answers = match answers {
        Some(raw) => parse_answers(&raw)?,
        None => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            run_session(&mut session, stdin.lock(), stdout.lock())?;
            session.answers().to_vec()
        }
    };
    let (result, tally) = score_detailed(&answers, session.questions());

    println!();
    match result {
        MbtiResult::Type(kind) => println!("Your type: {kind}"),
        MbtiResult::Unknown => println!("Your type could not be determined."),
    }
    if let Some(tally) = tally {
        for entry in tally.entries() {
            println!(
                "  {}: {} {} / {} {}",
                entry.dimension,
                entry.first_letter,
                entry.first_score,
                entry.second_letter,
                entry.second_score
            );
        }
    }

    let pipeline = analysis_pipeline(&config.analysis, offline)?;
    let outcome = pipeline.analyze(result).await;
    print_outcome(&outcome);
    Ok(())
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = load_cli_config()?;
    let result = MbtiResult::from_code(&args.code);
    let pipeline = analysis_pipeline(&config.analysis, args.offline)?;

    let options = AnalysisOptions {
        model: args.model,
        profile: if args.long_context {
            AnalysisProfile::LongContext
        } else {
            AnalysisProfile::Detailed
        },
    };

    let outcome = pipeline.analyze_with(result, options).await;
    print_outcome(&outcome);
    Ok(())
}

/// Loads configuration and sends logs to stderr so they stay out of the printed report.
fn load_cli_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;
    Ok(config)
}

fn print_outcome(outcome: &AnalysisOutcome) {
    println!();
    if let Some(model) = &outcome.model {
        println!("--- analysis ({model}) ---");
    } else {
        println!("--- analysis ---");
    }
    println!("{}", outcome.render());
}

/// Parses `5,4,,3` style input. Blank entries are unanswered questions.
pub(crate) fn parse_answers(raw: &str) -> Result<Vec<Answer>, AppError> {
    raw.split(',')
        .map(str::trim)
        .enumerate()
        .map(|(index, entry)| {
            if entry.is_empty() {
                return Ok(None);
            }
            entry.parse::<i32>().map(Some).map_err(|_| {
                AppError::Input(format!("answer {} ('{entry}') is not a number", index + 1))
            })
        })
        .collect()
}

/// Walks a session over line-based input. `b` goes back, an empty line skips, and end of
/// input stops with whatever has been answered.
pub(crate) fn run_session<R, W>(
    session: &mut TestSession,
    input: R,
    mut output: W,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        let progress = session.progress();
        writeln!(
            output,
            "\n[{}/{}] {}",
            progress.position,
            progress.total,
            session.current().text
        )?;
        let current = session
            .current_answer()
            .map(|value| format!(" (current: {value})"))
            .unwrap_or_default();
        write!(
            output,
            "answer {LIKERT_MIN}-{LIKERT_MAX}, b = back, enter = skip{current}: "
        )?;
        output.flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };

        match line.trim() {
            "b" | "back" => {
                if progress.is_first {
                    writeln!(output, "already at the first question")?;
                }
                session.retreat();
                continue;
            }
            "" => {}
            entry => match entry.parse::<i32>() {
                Ok(value) => {
                    if let Err(SessionError::AnswerOutOfRange(value)) = session.record(value) {
                        writeln!(output, "{value} is not on the {LIKERT_MIN}-{LIKERT_MAX} scale")?;
                        continue;
                    }
                }
                Err(_) => {
                    writeln!(output, "please enter a number between {LIKERT_MIN} and {LIKERT_MAX}")?;
                    continue;
                }
            },
        }

        if session.advance() == SessionStep::Complete {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn short_session() -> TestSession {
        let catalog = QuestionCatalog::builtin().expect("builtin catalog");
        TestSession::start(&catalog, Variant::Short).expect("short variant")
    }

    #[test]
    fn parses_blank_entries_as_unanswered() {
        let answers = parse_answers("5, 4,,1").expect("parses");
        assert_eq!(answers, vec![Some(5), Some(4), None, Some(1)]);
    }

    #[test]
    fn rejects_non_numeric_answers() {
        let err = parse_answers("5,x").expect_err("x is not a number");
        assert!(err.to_string().contains("answer 2"));
    }

    #[test]
    fn interactive_session_reaches_enfp() {
        let mut session = short_session();
        let input = Cursor::new("5\n5\n5\n5\n5\n5\n5\n5\n");
        let mut output: Vec<u8> = Vec::new();

        run_session(&mut session, input, &mut output).expect("session runs");

        assert_eq!(session.finish().to_string(), "ENFP");
        let transcript = String::from_utf8(output).expect("utf8 output");
        assert!(transcript.contains("[1/8]"));
        assert!(transcript.contains("[8/8]"));
    }

    #[test]
    fn invalid_entries_are_reprompted_and_back_revisits() {
        let mut session = short_session();
        let input = Cursor::new("9\nabc\n2\nb\n4\n");
        let mut output: Vec<u8> = Vec::new();

        run_session(&mut session, input, &mut output).expect("session runs");

        assert_eq!(session.answers()[0], Some(4));
        let transcript = String::from_utf8(output).expect("utf8 output");
        assert!(transcript.contains("9 is not on the 1-5 scale"));
        assert!(transcript.contains("please enter a number"));
        assert!(transcript.contains("(current: 2)"));
    }

    #[test]
    fn early_end_of_input_scores_what_was_answered() {
        let mut session = short_session();
        run_session(&mut session, Cursor::new(""), io::sink()).expect("runs");

        assert_eq!(session.answers(), &[None; 8]);
        assert_eq!(session.finish().to_string(), "INFP");
    }
}
