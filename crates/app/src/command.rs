use std::str::FromStr;

use thiserror::Error;

/// One line of learner input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Help,
    Answer { quick_check: String, option: String },
    Reveal { quick_check: String },
    Complete,
    Next,
    Prev,
    /// 1-based lesson number, as shown in `status`.
    Lesson(usize),
    Learn,
    Scenarios,
    Approach,
    Toggle { scenario: String, action: String },
    Check { scenario: String },
    Retake { scenario: String },
    ScenarioNext,
    ScenarioPrev,
    History,
    Restart,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommandError {
    #[error("empty input")]
    Empty,
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid lesson number `{0}`")]
    InvalidLesson(String),
}

pub const HELP: &str = "\
commands:
  status                      show the current view
  answer <quick-check> <opt>  select an answer in the current lesson
  reveal <quick-check>        lock in and show feedback
  complete                    mark the current lesson complete
  next | prev                 move between lessons
  lesson <n>                  jump to lesson n
  learn | scenarios | approach
                              switch tabs
  toggle <scenario> <action>  select or deselect a scenario action
  check <scenario>            reveal scenario feedback
  retake <scenario>           clear a revealed scenario
  snext | sprev               move between scenarios
  history                     lesson completions of this attempt
  restart                     start the course over as a new attempt
  quit";

fn one_arg<'a>(
    args: &[&'a str],
    usage: &'static str,
) -> Result<&'a str, CommandError> {
    match args {
        [arg] => Ok(*arg),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn two_args<'a>(
    args: &[&'a str],
    usage: &'static str,
) -> Result<(&'a str, &'a str), CommandError> {
    match args {
        [first, second] => Ok((*first, *second)),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn no_args(args: &[&str], command: Command, usage: &'static str) -> Result<Command, CommandError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::Usage(usage))
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let args: Vec<&str> = words.collect();

        match head.to_ascii_lowercase().as_str() {
            "status" | "s" => no_args(&args, Self::Status, "status"),
            "help" | "?" => no_args(&args, Self::Help, "help"),
            "answer" | "a" => {
                let (quick_check, option) = two_args(&args, "answer <quick-check> <option>")?;
                Ok(Self::Answer {
                    quick_check: quick_check.to_owned(),
                    option: option.to_owned(),
                })
            }
            "reveal" | "r" => Ok(Self::Reveal {
                quick_check: one_arg(&args, "reveal <quick-check>")?.to_owned(),
            }),
            "complete" | "c" => no_args(&args, Self::Complete, "complete"),
            "next" | "n" => no_args(&args, Self::Next, "next"),
            "prev" | "p" => no_args(&args, Self::Prev, "prev"),
            "lesson" => {
                let raw = one_arg(&args, "lesson <n>")?;
                match raw.parse::<usize>() {
                    Ok(n) if n >= 1 => Ok(Self::Lesson(n)),
                    _ => Err(CommandError::InvalidLesson(raw.to_owned())),
                }
            }
            "learn" => no_args(&args, Self::Learn, "learn"),
            "scenarios" => no_args(&args, Self::Scenarios, "scenarios"),
            "approach" => no_args(&args, Self::Approach, "approach"),
            "toggle" | "t" => {
                let (scenario, action) = two_args(&args, "toggle <scenario> <action>")?;
                Ok(Self::Toggle {
                    scenario: scenario.to_owned(),
                    action: action.to_owned(),
                })
            }
            "check" => Ok(Self::Check {
                scenario: one_arg(&args, "check <scenario>")?.to_owned(),
            }),
            "retake" => Ok(Self::Retake {
                scenario: one_arg(&args, "retake <scenario>")?.to_owned(),
            }),
            "snext" => no_args(&args, Self::ScenarioNext, "snext"),
            "sprev" => no_args(&args, Self::ScenarioPrev, "sprev"),
            "history" => no_args(&args, Self::History, "history"),
            "restart" => no_args(&args, Self::Restart, "restart"),
            "quit" | "exit" | "q" => no_args(&args, Self::Quit, "quit"),
            _ => Err(CommandError::Unknown(head.to_owned())),
        }
    }
}
