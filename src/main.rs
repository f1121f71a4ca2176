use academic_records::core::{StudentId, StudyPlanId, SubjectId, TeacherId, UserId};
use academic_records::domain::ports::ConfigProvider;
use academic_records::utils::error::ErrorSeverity;
use academic_records::utils::output::{self, OutputFormat};
use academic_records::utils::{logger, validation::Validate};
use academic_records::{CliArgs, Command, EngineConfig, InMemoryStore, RecordsEngine, RecordsError};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 載入配置，檔案不存在時使用預設值
    let config = if Path::new(&args.config).exists() {
        match EngineConfig::from_file(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
                eprintln!("💡 {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        }
    } else {
        EngineConfig::default()
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(args.verbose, config.logging.level.as_deref());
    } else {
        logger::init_cli_logger(args.verbose, config.logging.level.as_deref());
    }

    tracing::info!("Starting {}", config.engine.name);
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&args, &config).await {
        Ok(rendered) => {
            println!("{}", rendered);
        }
        Err(e) => {
            tracing::error!(
                "❌ Query failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(args: &CliArgs, config: &EngineConfig) -> Result<String, RecordsError> {
    let data_path = match &args.data {
        Some(path) => path.as_str(),
        None => config.data_path()?,
    };

    tracing::info!("📁 Loading dataset from: {}", data_path);
    let store = Arc::new(InMemoryStore::from_file(data_path, config.retained_snapshots())?);
    let engine = RecordsEngine::new(store, config);
    let format = args.format;

    match &args.command {
        Command::Subjects { teacher } => {
            let subjects = engine.effective_subjects(TeacherId(*teacher)).await?;
            output::render_list(&subjects, format)
        }
        Command::CanTeach { teacher, subject } => {
            let allowed = engine
                .can_teach(TeacherId(*teacher), SubjectId(*subject))
                .await?;
            render_answer(*teacher, *subject, allowed, format)
        }
        Command::Careers { teacher } => {
            let careers = engine.qualified_careers(TeacherId(*teacher)).await?;
            output::render_list(&careers, format)
        }
        Command::Record { student } => {
            let student = StudentId(*student);
            let record = engine.compute_record(student).await?;
            match format {
                OutputFormat::Json => output::to_json(&record),
                OutputFormat::Csv => output::render_records(&[(student, record)], format),
            }
        }
        Command::Records { students } => {
            let students: Vec<StudentId> = students.iter().copied().map(StudentId).collect();
            let records = engine.compute_records(&students).await?;
            output::render_records(&records, format)
        }
        Command::Current { student } => {
            let current = engine.current_subjects(StudentId(*student)).await?;
            output::render_enrollments(&current, format)
        }
        Command::Prerequisites {
            student,
            plan,
            subject,
        } => {
            let missing = engine
                .missing_prerequisites(StudentId(*student), StudyPlanId(*plan), SubjectId(*subject))
                .await?;
            output::render_list(&missing, format)
        }
        Command::Profile { user } => {
            let summary = engine.profile_summary(UserId(*user)).await?;
            // 摘要為巢狀結構，一律輸出 JSON
            output::to_json(&summary)
        }
    }
}

fn render_answer(
    teacher: u64,
    subject: u64,
    allowed: bool,
    format: OutputFormat,
) -> Result<String, RecordsError> {
    #[derive(serde::Serialize)]
    struct Answer {
        teacher_id: TeacherId,
        subject_id: SubjectId,
        can_teach: bool,
    }

    impl output::CsvRecord for Answer {
        const HEADERS: &'static [&'static str] = &["teacher_id", "subject_id", "can_teach"];
    }

    let answer = Answer {
        teacher_id: TeacherId(teacher),
        subject_id: SubjectId(subject),
        can_teach: allowed,
    };
    match format {
        OutputFormat::Json => output::to_json(&answer),
        OutputFormat::Csv => output::to_csv([answer]),
    }
}
