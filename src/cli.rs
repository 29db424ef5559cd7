// SPDX-License-Identifier: GPL-3.0-or-later
// src/cli.rs
//
// Command line host: argument parsing and dispatch into the workflows.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::app::admin::AdminConsole;
use crate::app::cropper::{CropHost, CropTool, CroppedImage};
use crate::app::message::CropMessage;
use crate::app::session;
use crate::app::student::StudentWorkspace;
use crate::app::teacher::{self, TeacherWorkspace};
use crate::config::AppConfig;
use crate::domain::account::{Account, ExamResult, Student};
use crate::domain::content;
use crate::domain::lesson::{ContentKind, DiagramKind, Lesson};
use crate::domain::media::{self, DataUrl};
use crate::fl;
use crate::records::{Collection, EditorSchema, row_id};
use crate::services::ai::{Difficulty, GeminiClient};
use crate::services::record_store::{RecordStoreClient, WriteOutcome};

#[derive(Debug, Parser)]
#[command(name = "lectern", version, about = "Lessons, AI-graded exercises and visual-aid cropping")]
pub struct Cli {
    /// Configuration file to use instead of the default location.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Credentials {
    #[arg(short, long)]
    pub user: String,
    #[arg(short, long)]
    pub password: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    Teacher,
    Student,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select a region of an image by replaying a pointer drag.
    Crop(CropArgs),
    /// Print the embeddable form of a content link.
    EmbedUrl { url: String },
    /// Check credentials for a role.
    Login {
        #[arg(value_enum)]
        role: RoleArg,
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Create a student account.
    Register(RegisterArgs),
    /// List your lessons, optionally filtered by title or code.
    Lessons {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a lesson or save one of your own.
    #[command(subcommand)]
    Lesson(LessonCommand),
    /// Ask for exercise suggestions on a topic.
    Suggest {
        #[command(flatten)]
        credentials: Credentials,
        topic: String,
        #[arg(long, default_value_t)]
        difficulty: Difficulty,
        #[arg(long, default_value_t = crate::constant::DEFAULT_SUGGESTION_COUNT)]
        count: usize,
    },
    /// Generate the figure of a question and save the lesson.
    Draw {
        #[command(flatten)]
        credentials: Credentials,
        /// Lesson code.
        code: String,
        /// Question number, starting at 1.
        #[arg(long)]
        question: usize,
        #[arg(long, value_parser = parse_diagram_kind, default_value = "2d")]
        kind: DiagramKind,
        /// Redraw the existing figure with this extra instruction.
        #[arg(long)]
        note: Option<String>,
    },
    /// Answer a lesson and have it graded.
    Submit {
        #[command(flatten)]
        credentials: Credentials,
        /// Lesson code.
        code: String,
        /// Answers in question order; repeat once per question.
        #[arg(long = "answer")]
        answers: Vec<String>,
        /// Photo of a handwritten answer, `NUMBER=PATH`.
        #[arg(long = "image", value_parser = parse_numbered_path)]
        images: Vec<(usize, PathBuf)>,
    },
    /// Your past results.
    History {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Results of students on your lessons.
    Results {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// List the rows of a collection.
    AdminList {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(value_parser = parse_collection)]
        collection: Collection,
    },
    /// Change one field of a row.
    AdminSet {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(value_parser = parse_collection)]
        collection: Collection,
        id: String,
        field: String,
        value: String,
    },
    /// Delete a row.
    AdminDelete {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(value_parser = parse_collection)]
        collection: Collection,
        id: String,
    },
    /// Inspect or change the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
pub struct CropArgs {
    /// Image path, http(s) URL or data URL.
    pub input: String,
    /// Size the image is rendered at, `WIDTHxHEIGHT`. Native size if omitted.
    #[arg(long, value_parser = parse_size, conflicts_with = "fit")]
    pub display: Option<(f32, f32)>,
    /// Fit the image into a `WIDTHxHEIGHT` viewport, keeping its aspect ratio.
    #[arg(long, value_parser = parse_size)]
    pub fit: Option<(f32, f32)>,
    /// Where the drag starts, `X,Y` in display coordinates.
    #[arg(long, value_parser = parse_point)]
    pub from: (f32, f32),
    /// Intermediate pointer positions.
    #[arg(long, value_parser = parse_point)]
    pub via: Vec<(f32, f32)>,
    /// Where the drag is released.
    #[arg(long, value_parser = parse_point)]
    pub to: (f32, f32),
    #[arg(short, long, default_value = "crop.png")]
    pub output: PathBuf,
    /// Also save the preview frame with the selection drawn on it.
    #[arg(long)]
    pub preview: Option<PathBuf>,
    /// Print the crop as a data URL.
    #[arg(long)]
    pub data_url: bool,
    /// Print the bare base64 PNG payload.
    #[arg(long, conflicts_with = "data_url")]
    pub base64: bool,
    /// Open the cropped image with the system viewer.
    #[arg(long)]
    pub open: bool,
    /// Attach the crop to a question of one of your lessons, `CODE:NUMBER`.
    #[arg(long, value_parser = parse_attach, requires_all = ["user", "password"])]
    pub attach: Option<(String, usize)>,
    #[arg(short, long)]
    pub user: Option<String>,
    #[arg(short, long)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub credentials: Credentials,
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub school: String,
    #[arg(long, default_value = "")]
    pub grade: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
}

#[derive(Debug, Subcommand)]
pub enum LessonCommand {
    /// Open a lesson by code.
    Show {
        #[command(flatten)]
        credentials: Credentials,
        code: String,
    },
    /// Create a lesson, or update one of yours with `--code`.
    Save(SaveLessonArgs),
}

#[derive(Debug, Args)]
pub struct SaveLessonArgs {
    #[command(flatten)]
    pub credentials: Credentials,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    /// Question to append; repeat for several.
    #[arg(long = "question")]
    pub questions: Vec<String>,
    /// Content link; an empty value removes it.
    #[arg(long)]
    pub link: Option<String>,
    #[arg(long, value_parser = parse_content_kind)]
    pub kind: Option<ContentKind>,
    /// Topic to request suggestions for.
    #[arg(long)]
    pub suggest: Option<String>,
    #[arg(long, default_value_t)]
    pub difficulty: Difficulty,
    #[arg(long, default_value_t = crate::constant::DEFAULT_SUGGESTION_COUNT)]
    pub count: usize,
    /// Suggestion numbers to append, e.g. `--pick 1,3`.
    #[arg(long, value_delimiter = ',', requires = "suggest")]
    pub pick: Vec<usize>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Change one setting, e.g. `endpoints.lessons https://...`.
    Set { key: String, value: String },
    /// Print where the configuration file lives.
    Path,
}

fn parse_pair(value: &str, separator: char) -> Result<(f32, f32), String> {
    let (a, b) = value
        .split_once(separator)
        .ok_or_else(|| format!("expected two numbers separated by `{separator}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|err| format!("`{part}`: {err}"))
    };
    Ok((parse(a)?, parse(b)?))
}

fn parse_point(value: &str) -> Result<(f32, f32), String> {
    parse_pair(value, ',')
}

fn parse_size(value: &str) -> Result<(f32, f32), String> {
    let (width, height) = parse_pair(&value.to_lowercase(), 'x')?;
    if width <= 0.0 || height <= 0.0 {
        return Err("display size must be positive".into());
    }
    Ok((width, height))
}

fn parse_collection(value: &str) -> Result<Collection, String> {
    Collection::parse(value)
        .ok_or_else(|| format!("unknown collection `{value}` (teachers, students, lessons, results)"))
}

fn parse_diagram_kind(value: &str) -> Result<DiagramKind, String> {
    DiagramKind::parse(value).ok_or_else(|| format!("unknown figure kind `{value}` (2d, 3d, chart)"))
}

fn parse_content_kind(value: &str) -> Result<ContentKind, String> {
    ContentKind::parse(value)
        .ok_or_else(|| format!("unknown content kind `{value}` (video, document, link)"))
}

fn parse_number(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("`{value}` is not a question number")),
        Ok(n) => Ok(n),
    }
}

fn parse_numbered_path(value: &str) -> Result<(usize, PathBuf), String> {
    let (number, path) = value
        .split_once('=')
        .ok_or_else(|| "expected NUMBER=PATH".to_string())?;
    Ok((parse_number(number)?, PathBuf::from(path)))
}

fn parse_attach(value: &str) -> Result<(String, usize), String> {
    let (code, number) = value
        .rsplit_once(':')
        .ok_or_else(|| "expected CODE:NUMBER".to_string())?;
    Ok((code.trim().to_string(), parse_number(number)?))
}

/// Question numbers on the command line start at 1.
fn question_index(number: usize) -> anyhow::Result<usize> {
    number
        .checked_sub(1)
        .with_context(|| format!("`{number}` is not a question number"))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let path = match cli.config {
        Some(path) => path,
        None => AppConfig::default_path().context("No configuration directory on this system")?,
    };
    let config = AppConfig::load_from(&path)?;

    match cli.command {
        Command::Config(command) => configure(command, config, &path),
        Command::EmbedUrl { url } => {
            println!("{}", content::embed_url(&url));
            Ok(())
        }
        Command::Crop(args) => crop(args, &config).await,
        Command::Login { role, credentials } => login(role, &credentials, &config).await,
        Command::Register(args) => register(args, &config).await,
        Command::Lessons {
            credentials,
            search,
        } => list_lessons(&credentials, search.as_deref(), &config).await,
        Command::Lesson(LessonCommand::Show { credentials, code }) => {
            show_lesson(&credentials, &code, &config).await
        }
        Command::Lesson(LessonCommand::Save(args)) => save_lesson(args, &config).await,
        Command::Suggest {
            credentials,
            topic,
            difficulty,
            count,
        } => suggest(&credentials, &topic, difficulty, count, &config).await,
        Command::Draw {
            credentials,
            code,
            question,
            kind,
            note,
        } => draw(&credentials, &code, question, kind, note.as_deref(), &config).await,
        Command::Submit {
            credentials,
            code,
            answers,
            images,
        } => submit(&credentials, &code, answers, &images, &config).await,
        Command::History { credentials } => history(&credentials, &config).await,
        Command::Results { credentials } => results(&credentials, &config).await,
        Command::AdminList {
            credentials,
            collection,
        } => admin_list(&credentials, collection, &config).await,
        Command::AdminSet {
            credentials,
            collection,
            id,
            field,
            value,
        } => admin_set(&credentials, collection, &id, &field, &value, &config).await,
        Command::AdminDelete {
            credentials,
            collection,
            id,
        } => admin_delete(&credentials, collection, &id, &config).await,
    }
}

fn store(config: &AppConfig) -> anyhow::Result<RecordStoreClient> {
    RecordStoreClient::new(config.endpoints.clone(), config.request_timeout())
        .context("Failed to create the record store client")
}

fn ai(config: &AppConfig) -> anyhow::Result<GeminiClient> {
    GeminiClient::new(&config.ai, config.api_key(), config.request_timeout())
        .context("Failed to create the AI client")
}

fn configure(command: ConfigCommand, mut config: AppConfig, path: &Path) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Path => println!("{}", path.display()),
        ConfigCommand::Show => {
            let text = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("{text}");
        }
        ConfigCommand::Set { key, value } => {
            config.set(&key, &value)?;
            config.save_to(path)?;
            println!("{}", fl!("config-saved", path = path.display().to_string()));
        }
    }
    Ok(())
}

/// Receives the crop tool's output.
#[derive(Debug, Default)]
struct CropOutcome {
    cropped: Option<CroppedImage>,
    closed: bool,
}

impl CropHost for CropOutcome {
    fn on_cropped(&mut self, image: CroppedImage) {
        self.cropped = Some(image);
    }

    fn on_closed(&mut self) {
        self.closed = true;
    }
}

/// Relative paths that do not exist are looked up in the default image
/// directory.
fn resolve_source(input: &str, config: &AppConfig) -> String {
    let input = input.trim();
    if media::is_data_url(input) || input.starts_with("http://") || input.starts_with("https://") {
        return input.to_string();
    }

    let path = Path::new(input);
    match &config.default_image_dir {
        Some(dir) if path.is_relative() && !path.exists() => dir.join(path).display().to_string(),
        _ => input.to_string(),
    }
}

async fn crop(args: CropArgs, config: &AppConfig) -> anyhow::Result<()> {
    let source = resolve_source(&args.input, config);
    let mut tool = CropTool::open(&source)
        .await
        .with_context(|| format!("Failed to open {source}"))?;
    if let Some((width, height)) = args.display {
        tool.handle(
            CropMessage::Resize {
                left: 0.0,
                top: 0.0,
                width,
                height,
            },
            &mut CropOutcome::default(),
        )?;
    } else if let Some((width, height)) = args.fit {
        tool.fit_display(0.0, 0.0, width, height);
    }

    let mut outcome = CropOutcome::default();
    for message in CropMessage::drag(args.from, &args.via, args.to) {
        tool.handle(message, &mut outcome)?;
    }

    if let Some(preview) = &args.preview {
        tool.frame()
            .save(preview)
            .with_context(|| format!("Failed to save preview {}", preview.display()))?;
        println!("{}", fl!("crop-preview-saved", path = preview.display().to_string()));
    }

    let rect = tool.selection();
    log::debug!(
        "Crop tool {:?} after drag, selection {:.1}x{:.1} at ({:.1}, {:.1})",
        tool.phase(),
        rect.w,
        rect.h,
        rect.x,
        rect.y
    );

    let message = if tool.can_confirm() {
        CropMessage::Apply
    } else {
        CropMessage::Cancel
    };
    tool.handle(message, &mut outcome)?;

    let Some(cropped) = outcome.cropped else {
        println!("{}", fl!("crop-empty"));
        return Ok(());
    };

    fs::write(&args.output, &cropped.png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "{}",
        fl!(
            "crop-saved",
            width = cropped.width().to_string(),
            height = cropped.height().to_string(),
            path = args.output.display().to_string()
        )
    );

    if args.data_url {
        println!("{}", cropped.to_data_url());
    } else if args.base64 {
        println!("{}", cropped.to_base64());
    }

    if let Some((code, number)) = &args.attach {
        let (Some(user), Some(password)) = (&args.user, &args.password) else {
            bail!("--attach needs --user and --password");
        };
        let store = store(config)?;
        let ai = ai(config)?;
        let teacher = session::login_teacher(&store, user, password).await?;
        let desk = TeacherWorkspace::new(&store, &ai, teacher);

        let mut lesson = find_own_lesson(&desk, code).await?;
        teacher::crop_visual_aid(&mut lesson, question_index(*number)?, &cropped)?;
        let lesson = desk.save_lesson(lesson).await?;
        println!(
            "{}",
            fl!("crop-attached", number = number.to_string(), code = lesson.code.as_str())
        );
    }

    if args.open {
        open::that(&args.output)
            .with_context(|| format!("Failed to open {}", args.output.display()))?;
    }
    Ok(())
}

async fn login(role: RoleArg, credentials: &Credentials, config: &AppConfig) -> anyhow::Result<()> {
    let Credentials { user, password } = credentials;
    let account = match role {
        RoleArg::Admin => session::login_admin(&config.admin, user, password)?,
        RoleArg::Teacher => Account::Teacher(session::login_teacher(&store(config)?, user, password).await?),
        RoleArg::Student => Account::Student(session::login_student(&store(config)?, user, password).await?),
    };
    println!(
        "{}",
        fl!(
            "login-ok",
            name = account.display_name(),
            role = account.role().to_string()
        )
    );
    Ok(())
}

async fn register(args: RegisterArgs, config: &AppConfig) -> anyhow::Result<()> {
    let student = Student {
        username: args.credentials.user,
        password: args.credentials.password,
        full_name: args.name,
        school: args.school,
        grade: args.grade,
        email: args.email,
        phone: args.phone,
        registration_date: None,
    };
    let student = session::register_student(&store(config)?, student, Local::now().naive_local()).await?;
    println!("{}", fl!("registered", username = student.username.as_str()));
    Ok(())
}

async fn find_own_lesson(
    desk: &TeacherWorkspace<'_, RecordStoreClient, GeminiClient>,
    code: &str,
) -> anyhow::Result<Lesson> {
    desk.my_lessons()
        .await?
        .into_iter()
        .find(|lesson| lesson.has_code(code))
        .with_context(|| format!("You have no lesson with code `{code}`"))
}

fn print_lesson_line(lesson: &Lesson) {
    println!(
        "{}  {}  ({})",
        lesson.code,
        lesson.title,
        fl!("question-count", count = lesson.valid_questions().len())
    );
}

async fn list_lessons(
    credentials: &Credentials,
    search: Option<&str>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let store = store(config)?;
    let ai = ai(config)?;
    let teacher = session::login_teacher(&store, &credentials.user, &credentials.password).await?;
    let desk = TeacherWorkspace::new(&store, &ai, teacher);

    let lessons = match search {
        Some(term) => desk.search_lessons(term).await?,
        None => desk.my_lessons().await?,
    };
    if lessons.is_empty() {
        println!("{}", fl!("no-lessons"));
    }
    lessons.iter().for_each(print_lesson_line);
    Ok(())
}

async fn show_lesson(credentials: &Credentials, code: &str, config: &AppConfig) -> anyhow::Result<()> {
    let store = store(config)?;
    let ai = ai(config)?;
    let student = session::login_student(&store, &credentials.user, &credentials.password).await?;
    let desk = StudentWorkspace::new(&store, &ai, student, config.ai.max_concurrent_requests);

    let lesson = desk.fetch_lesson(code).await?;
    println!("{}", lesson.title);
    if let Some(url) = lesson.embed_url() {
        println!("{}", fl!("lesson-content", kind = lesson.content_kind.as_str(), url = url));
    }
    for (index, question) in lesson.questions.iter().enumerate() {
        println!("{}. {question}", index + 1);
        if let Some(aid) = lesson.visual_aids.get(&index) {
            println!("   {}", fl!("lesson-aid", kind = aid.kind.as_str()));
        }
    }
    Ok(())
}

async fn save_lesson(args: SaveLessonArgs, config: &AppConfig) -> anyhow::Result<()> {
    let store = store(config)?;
    let ai = ai(config)?;
    let teacher =
        session::login_teacher(&store, &args.credentials.user, &args.credentials.password).await?;
    let desk = TeacherWorkspace::new(&store, &ai, teacher);

    let mut lesson = match &args.code {
        Some(code) => find_own_lesson(&desk, code).await?,
        None => Lesson::default(),
    };
    if let Some(title) = args.title {
        lesson.title = title;
    }
    lesson.questions.extend(args.questions);
    if let Some(link) = args.link {
        lesson.content_url = Some(link);
    }
    if let Some(kind) = args.kind {
        lesson.content_kind = kind;
    }

    if let Some(topic) = &args.suggest {
        let suggestions = desk.suggest_questions(topic, args.difficulty, args.count).await?;
        if args.pick.is_empty() {
            print_suggestions(topic, &suggestions);
            return Ok(());
        }
        let picked: Vec<usize> = args.pick.iter().filter_map(|n| n.checked_sub(1)).collect();
        let added = teacher::add_selected(&mut lesson, &suggestions, &picked)?;
        println!("{}", fl!("suggestions-added", count = added));
    }

    let lesson = desk.save_lesson(lesson).await?;
    println!(
        "{}",
        fl!("lesson-saved", code = lesson.code.as_str(), title = lesson.title.as_str())
    );
    Ok(())
}

fn print_suggestions(topic: &str, suggestions: &[String]) {
    println!("{}", fl!("suggestions-for", topic = topic));
    for (index, suggestion) in suggestions.iter().enumerate() {
        println!("{}. {suggestion}", index + 1);
    }
}

async fn suggest(
    credentials: &Credentials,
    topic: &str,
    difficulty: Difficulty,
    count: usize,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let store = store(config)?;
    let ai = ai(config)?;
    let teacher = session::login_teacher(&store, &credentials.user, &credentials.password).await?;
    let desk = TeacherWorkspace::new(&store, &ai, teacher);

    let suggestions = desk.suggest_questions(topic, difficulty, count).await?;
    print_suggestions(topic, &suggestions);
    Ok(())
}

async fn draw(
    credentials: &Credentials,
    code: &str,
    number: usize,
    kind: DiagramKind,
    note: Option<&str>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let store = store(config)?;
    let ai = ai(config)?;
    let teacher = session::login_teacher(&store, &credentials.user, &credentials.password).await?;
    let desk = TeacherWorkspace::new(&store, &ai, teacher);

    let index = question_index(number)?;
    let mut lesson = find_own_lesson(&desk, code).await?;
    let aid = match note {
        Some(note) => desk.redraw_visual_aid(&mut lesson, index, note).await?,
        None => desk.draw_visual_aid(&mut lesson, index, kind).await?,
    };
    let aid_kind = aid.kind;

    let lesson = desk.save_lesson(lesson).await?;
    println!(
        "{}",
        fl!(
            "diagram-saved",
            kind = aid_kind.as_str(),
            number = number.to_string(),
            code = lesson.code.as_str()
        )
    );
    Ok(())
}

fn read_image(path: &Path) -> anyhow::Result<DataUrl> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mime = media::sniff_image_mime(&bytes)
        .with_context(|| format!("{} is not a supported image", path.display()))?;
    Ok(DataUrl {
        mime: mime.to_string(),
        bytes,
    })
}

async fn submit(
    credentials: &Credentials,
    code: &str,
    answers: Vec<String>,
    images: &[(usize, PathBuf)],
    config: &AppConfig,
) -> anyhow::Result<()> {
    let store = store(config)?;
    let ai = ai(config)?;
    let student = session::login_student(&store, &credentials.user, &credentials.password).await?;
    let desk = StudentWorkspace::new(&store, &ai, student, config.ai.max_concurrent_requests);

    let lesson = desk.fetch_lesson(code).await?;
    let slots = images.iter().map(|(n, _)| *n).max().unwrap_or(0);
    let mut attached: Vec<Option<DataUrl>> = vec![None; slots];
    for (number, path) in images {
        attached[question_index(*number)?] = Some(read_image(path)?);
    }

    let report = desk.submit(&lesson, &answers, &attached).await?;
    println!("{} - {}", report.result.student_name, report.result.lesson_title);
    for (index, grade) in report.sheet.grades.iter().enumerate() {
        println!("{}. {}/10  {}", index + 1, grade.score, grade.feedback);
    }
    println!("{}", fl!("submission-total", score = report.sheet.average_display()));
    if let WriteOutcome::Rejected(reason) = &report.stored {
        println!("{}", fl!("submission-not-stored", reason = reason.as_str()));
    }
    Ok(())
}

fn print_results(results: &[ExamResult]) {
    if results.is_empty() {
        println!("{}", fl!("no-results"));
    }
    for result in results {
        println!(
            "{}  {}  {}  {}  [{}]",
            result.lesson_code,
            result.lesson_title,
            result.student_name,
            result.total_display(),
            result.question_scores
        );
    }
}

async fn history(credentials: &Credentials, config: &AppConfig) -> anyhow::Result<()> {
    let store = store(config)?;
    let ai = ai(config)?;
    let student = session::login_student(&store, &credentials.user, &credentials.password).await?;
    let desk = StudentWorkspace::new(&store, &ai, student, config.ai.max_concurrent_requests);

    print_results(&desk.history().await?);
    Ok(())
}

async fn results(credentials: &Credentials, config: &AppConfig) -> anyhow::Result<()> {
    let store = store(config)?;
    let ai = ai(config)?;
    let teacher = session::login_teacher(&store, &credentials.user, &credentials.password).await?;
    let desk = TeacherWorkspace::new(&store, &ai, teacher);

    print_results(&desk.results_for_me().await?);
    Ok(())
}

async fn admin_list(
    credentials: &Credentials,
    collection: Collection,
    config: &AppConfig,
) -> anyhow::Result<()> {
    session::login_admin(&config.admin, &credentials.user, &credentials.password)?;
    let store = store(config)?;
    let console = AdminConsole::new(&store);

    let schema = EditorSchema::for_collection(collection);
    let header: Vec<String> = schema.columns().into_iter().map(|c| c.label).collect();
    println!("{} | {}", fl!("field-stt"), header.join(" | "));
    for row in console.list(collection).await? {
        let id = row_id(&row).unwrap_or_default();
        println!("{id} | {}", schema.cells(&row).join(" | "));
    }
    Ok(())
}

async fn admin_set(
    credentials: &Credentials,
    collection: Collection,
    id: &str,
    field: &str,
    value: &str,
    config: &AppConfig,
) -> anyhow::Result<()> {
    session::login_admin(&config.admin, &credentials.user, &credentials.password)?;
    let store = store(config)?;
    AdminConsole::new(&store)
        .set_field(collection, id, field, value)
        .await?;
    println!(
        "{}",
        fl!("admin-updated", id = id, collection = collection.label())
    );
    Ok(())
}

async fn admin_delete(
    credentials: &Credentials,
    collection: Collection,
    id: &str,
    config: &AppConfig,
) -> anyhow::Result<()> {
    session::login_admin(&config.admin, &credentials.user, &credentials.password)?;
    let store = store(config)?;
    AdminConsole::new(&store).delete(collection, id).await?;
    println!(
        "{}",
        fl!("admin-deleted", id = id, collection = collection.label())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn point_and_size_arguments() {
        assert_eq!(parse_point("12.5, 40"), Ok((12.5, 40.0)));
        assert!(parse_point("12").is_err());
        assert_eq!(parse_size("800X600"), Ok((800.0, 600.0)));
        assert!(parse_size("0x600").is_err());
    }

    #[test]
    fn question_numbers_start_at_one() {
        assert_eq!(parse_attach("ABC:2"), Ok(("ABC".to_string(), 2)));
        assert!(parse_attach("ABC:0").is_err());
        assert_eq!(
            parse_numbered_path("3=photo.jpg"),
            Ok((3, PathBuf::from("photo.jpg")))
        );
        assert!(question_index(0).is_err());
        assert_eq!(question_index(1).unwrap(), 0);
    }

    #[test]
    fn crop_replays_drag() {
        let cli = Cli::try_parse_from([
            "lectern", "crop", "board.png", "--display", "200x100", "--from", "10,10", "--via",
            "20,20", "--to", "60,40",
        ])
        .unwrap();
        let Command::Crop(args) = cli.command else {
            panic!("expected crop");
        };
        assert_eq!(args.display, Some((200.0, 100.0)));
        assert_eq!(args.via, vec![(20.0, 20.0)]);
        assert_eq!(args.output, PathBuf::from("crop.png"));
    }

    #[test]
    fn display_and_fit_are_exclusive() {
        let parsed = Cli::try_parse_from([
            "lectern", "crop", "a.png", "--from", "0,0", "--to", "5,5", "--display", "10x10",
            "--fit", "10x10",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn attach_needs_credentials() {
        let parsed = Cli::try_parse_from([
            "lectern", "crop", "a.png", "--from", "0,0", "--to", "5,5", "--attach", "ABC:1",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn remote_sources_are_left_alone() {
        let config = AppConfig {
            default_image_dir: Some(PathBuf::from("/pictures")),
            ..AppConfig::default()
        };
        assert_eq!(resolve_source("https://x.test/a.png", &config), "https://x.test/a.png");
        assert_eq!(
            resolve_source("no-such-file.png", &config),
            Path::new("/pictures").join("no-such-file.png").display().to_string()
        );
    }
}
