use crate::utils::output::OutputFormat;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "academic-records")]
#[command(about = "Teacher qualification and student academic record queries")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "academic-records.toml")]
    pub config: String,

    /// Dataset file (.json or .toml), overrides data.path from the config
    #[arg(short, long)]
    pub data: Option<String>,

    /// Output format: json or csv
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Subjects a teacher is qualified to teach
    Subjects {
        #[arg(long)]
        teacher: u64,
    },
    /// Whether a teacher is qualified for one subject
    CanTeach {
        #[arg(long)]
        teacher: u64,
        #[arg(long)]
        subject: u64,
    },
    /// Careers a teacher holds a blanket grant for
    Careers {
        #[arg(long)]
        teacher: u64,
    },
    /// Academic record of one student
    Record {
        #[arg(long)]
        student: u64,
    },
    /// Academic records of several students
    Records {
        #[arg(long, value_delimiter = ',', required = true)]
        students: Vec<u64>,
    },
    /// Subjects a student is currently enrolled in
    Current {
        #[arg(long)]
        student: u64,
    },
    /// Prerequisites a student still has to pass
    Prerequisites {
        #[arg(long)]
        student: u64,
        #[arg(long)]
        plan: u64,
        #[arg(long)]
        subject: u64,
    },
    /// Summary for a user, by profile kind
    Profile {
        #[arg(long)]
        user: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records_command() {
        let args = CliArgs::parse_from([
            "academic-records",
            "--format",
            "csv",
            "records",
            "--students",
            "1,2,3",
        ]);

        assert_eq!(args.format, OutputFormat::Csv);
        assert_eq!(args.config, "academic-records.toml");
        match args.command {
            Command::Records { students } => assert_eq!(students, vec![1, 2, 3]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_can_teach() {
        let args = CliArgs::parse_from([
            "academic-records",
            "--data",
            "campus.json",
            "can-teach",
            "--teacher",
            "4",
            "--subject",
            "12",
        ]);

        assert_eq!(args.data.as_deref(), Some("campus.json"));
        assert!(matches!(args.command, Command::CanTeach { teacher: 4, subject: 12 }));
    }
}
