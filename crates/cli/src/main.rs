//! Command-line conversion harness for course payloads.
//!
//! All file I/O happens here, at the outermost layer; the codecs themselves
//! stay pure. Conversions run with an identity display lookup and an empty
//! side-table unless the payload itself carries metadata.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edu_format::{local, remote, DisplayLookup};
use edu_model::{Course, RemoteInfoTable, StudyItem};

#[derive(Parser)]
#[command(name = "edu")]
#[command(about = "Course payload conversion tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a local course file to the remote wire format
    Export {
        /// Local-format course file to read
        input: PathBuf,
        /// Wire-format file to write
        output: PathBuf,
    },
    /// Convert a remote wire payload to a local course file
    Import {
        /// Wire-format file to read
        input: PathBuf,
        /// Local-format course file to write
        output: PathBuf,
    },
    /// Print a one-line-per-entity outline of a course payload
    Show {
        /// Course file to read
        input: PathBuf,
        /// Treat the input as a remote wire payload
        #[arg(long)]
        remote: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("edu=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Export { input, output } => export(&input, &output)?,
        Commands::Import { input, output } => import(&input, &output)?,
        Commands::Show { input, remote } => show(&input, remote)?,
    }
    Ok(())
}

fn export(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(input)?;
    let course = local::read_course_yaml(&text)?;
    let json = remote::write_course_json(&course, &RemoteInfoTable::new())?;
    std::fs::write(output, json)?;
    tracing::info!("exported {} to {}", input.display(), output.display());
    Ok(())
}

fn import(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(input)?;
    let (course, _remote_info) = remote::read_course_json(&text)?;
    let yaml = local::write_course_yaml(&course, &DisplayLookup::identity())?;
    std::fs::write(output, yaml)?;
    tracing::info!("imported {} to {}", input.display(), output.display());
    Ok(())
}

fn show(input: &Path, remote: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(input)?;
    let course = if remote {
        remote::read_course_json(&text)?.0
    } else {
        local::read_course_yaml(&text)?
    };
    print!("{}", outline(&course));
    Ok(())
}

fn outline(course: &Course) -> String {
    let mut out = String::new();
    out.push_str(&format!("course: {}\n", course.title));
    for item in &course.items {
        match item {
            StudyItem::Section(section) => {
                out.push_str(&format!(
                    "  section: {} ({} lessons)\n",
                    section.title,
                    section.lessons.len()
                ));
                for lesson in &section.lessons {
                    out.push_str(&format!(
                        "    lesson: {} ({} tasks)\n",
                        lesson.title,
                        lesson.tasks.len()
                    ));
                }
            }
            StudyItem::Lesson(lesson) => {
                out.push_str(&format!(
                    "  lesson: {} ({} tasks)\n",
                    lesson.title,
                    lesson.tasks.len()
                ));
            }
        }
    }
    out
}
