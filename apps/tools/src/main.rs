use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::{
    domain::{FestivalId, PerformerId},
    forms::{FestivalForm, FormErrors, PerformerForm},
};
use storage::{is_missing_festival, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/festivals.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print how many performers and festivals are stored.
    Summary,
    Festivals,
    /// List performers with the festival they play at.
    Performers,
    AddFestival {
        #[arg(long, default_value = shared::domain::DEFAULT_FESTIVAL_NAME)]
        name: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, default_value = shared::domain::DEFAULT_FESTIVAL_LOCATION)]
        location: String,
    },
    AddPerformer {
        name: String,
        #[arg(long)]
        band: bool,
        #[arg(long)]
        festival: Option<i64>,
    },
    /// Delete a festival; its performers stay without a festival.
    DeleteFestival {
        festival_id: i64,
    },
    DeletePerformer {
        performer_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Summary => {
            let summary = storage.summary().await?;
            println!("performers={}", summary.performers);
            println!("festivals={}", summary.festivals);
        }
        Command::Festivals => {
            for festival in storage.list_festivals().await? {
                println!("{}\t{festival}", festival.id);
            }
        }
        Command::Performers => {
            for performer in storage.list_performers().await? {
                let festival = match performer.festival {
                    Some(id) => id.to_string(),
                    None => "-".into(),
                };
                println!("{}\t{performer}\tfestival={festival}", performer.id);
            }
        }
        Command::AddFestival {
            name,
            start,
            end,
            location,
        } => {
            let form = FestivalForm {
                name,
                start: start.unwrap_or_default(),
                end: end.unwrap_or_default(),
                location,
            };
            let input = form
                .validate()
                .map_err(|errors| invalid("festival", &errors))?;
            let festival_id = storage.create_festival(&input).await?;
            println!("created festival_id={festival_id}");
        }
        Command::AddPerformer {
            name,
            band,
            festival,
        } => {
            let form = PerformerForm {
                name,
                is_band: band.to_string(),
                festival: festival.map(|id| id.to_string()).unwrap_or_default(),
            };
            let input = form
                .validate()
                .map_err(|errors| invalid("performer", &errors))?;
            let performer_id = match storage.create_performer(&input).await {
                Ok(performer_id) => performer_id,
                Err(err) if is_missing_festival(&err) => {
                    bail!("festival {} does not exist", form.festival);
                }
                Err(err) => return Err(err),
            };
            println!("created performer_id={performer_id}");
        }
        Command::DeleteFestival { festival_id } => {
            if !storage.delete_festival(FestivalId(festival_id)).await? {
                bail!("festival {festival_id} does not exist");
            }
            println!("deleted festival_id={festival_id}");
        }
        Command::DeletePerformer { performer_id } => {
            if !storage.delete_performer(PerformerId(performer_id)).await? {
                bail!("performer {performer_id} does not exist");
            }
            println!("deleted performer_id={performer_id}");
        }
    }

    Ok(())
}

fn invalid(what: &str, errors: &FormErrors) -> anyhow::Error {
    let details: Vec<String> = errors
        .fields
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
        .collect();
    anyhow::anyhow!("invalid {what}: {}", details.join("; "))
}
