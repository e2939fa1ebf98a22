use std::error::Error;
use std::path::PathBuf;

use atty::Stream;
use clap::{Parser, Subcommand};
use serde_json::json;
use studio_roster::filter::{self, FacetSelection};
use studio_roster::model::Roster;
use studio_roster::{AppConfig, Member, bio, links};
use termimad::{FmtText, MadSkin, terminal_size};

#[derive(Parser, Debug)]
#[command(name = "studio-roster", about = "Browse the studio member directory", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the JSON data files.
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Operations on member records.
    #[command(subcommand)]
    Members(MembersCommand),
    /// Check whether a URL is trusted by the whitelist.
    CheckUrl {
        /// URL to classify.
        url: String,
    },
    /// Run the HTTP directory server.
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
        /// Public base URL used in rendered pages.
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        base_url: String,
    },
}

#[derive(Subcommand, Debug)]
enum MembersCommand {
    /// List visible members for a facet selection.
    List {
        /// Department identifier, or omit for all.
        #[arg(long)]
        dept: Option<String>,
        /// Role identifier; only meaningful with a department.
        #[arg(long)]
        role: Option<String>,
        /// Tool identifier; only meaningful with a role.
        #[arg(long)]
        tool: Option<String>,
    },
    /// Show a single member's full record with rendered bio markup.
    Show {
        /// Member identifier.
        id: String,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Members(MembersCommand::List { dept, role, tool }) => {
            handle_list(&cli.data_dir, dept, role, tool, cli.json)
        }
        Command::Members(MembersCommand::Show { id }) => handle_show(&cli.data_dir, &id, cli.json),
        Command::CheckUrl { url } => handle_check_url(&cli.data_dir, &url, cli.json),
        #[cfg(feature = "web")]
        Command::Serve { addr, base_url } => handle_serve(cli.data_dir, addr, base_url),
    }
}

fn handle_list(
    data_dir: &std::path::Path,
    dept: Option<String>,
    role: Option<String>,
    tool: Option<String>,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let roster = Roster::load(data_dir)?;
    let selection = FacetSelection::from_query(dept.as_deref(), role.as_deref(), tool.as_deref());
    let visible = filter::visible_members(&selection, &roster.members, &roster.taxonomy);

    if as_json {
        let payload: Vec<_> = visible
            .iter()
            .map(|member| {
                json!({
                    "id": member.id,
                    "name": member.name,
                    "roles": member
                        .role_ids()
                        .iter()
                        .map(|rid| roster.taxonomy.role_name(rid))
                        .collect::<Vec<_>>(),
                    "sort_order": member.sort_order,
                    "is_lead": member.is_lead,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_member_table(&visible, &roster);
    }
    Ok(())
}

fn handle_show(data_dir: &std::path::Path, id: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let roster = Roster::load(data_dir)?;
    let member = roster
        .members
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| format!("No member with id {id:?}"))?;

    if as_json {
        let payload = json!({
            "id": member.id,
            "name": member.name,
            "avatar": member.avatar,
            "roles": member
                .role_ids()
                .iter()
                .map(|rid| json!({
                    "id": rid,
                    "name": roster.taxonomy.role_name(rid),
                    "color": roster.taxonomy.role_color(rid),
                }))
                .collect::<Vec<_>>(),
            "tools": member.tools,
            "tool": member.tool,
            "bio": member.bio,
            "bio_html": bio::render(&member.bio),
            "links": member.links,
            "sort_order": member.sort_order,
            "is_lead": member.is_lead,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_member(member, &roster);
    }
    Ok(())
}

fn handle_check_url(
    data_dir: &std::path::Path,
    url: &str,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load(data_dir);
    let trusted = links::is_trusted(url, &config.whitelist);
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "url": url, "trusted": trusted }))?
        );
    } else if trusted {
        println!("{url}: trusted (whitelisted host)");
    } else {
        println!("{url}: untrusted");
    }
    Ok(())
}

#[cfg(feature = "web")]
fn handle_serve(
    data_dir: PathBuf,
    addr: std::net::SocketAddr,
    base_url: String,
) -> Result<(), Box<dyn Error>> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(studio_roster::web::serve(studio_roster::web::WebConfig {
        addr,
        data_dir,
        base_url,
    }))?;
    Ok(())
}

fn print_member_table(members: &[&Member], roster: &Roster) {
    if members.is_empty() {
        println!("No members match this selection.");
        return;
    }
    let mut table = String::from("|Id|Name|Roles|Tools|Order|\n|-|-|-|-|-|\n");
    for member in members {
        let roles = member
            .role_ids()
            .iter()
            .map(|rid| roster.taxonomy.role_name(rid))
            .collect::<Vec<_>>()
            .join(", ");
        let mut tools: Vec<String> = Vec::new();
        if let Some(tool) = member.tool.as_deref() {
            tools.push(roster.taxonomy.tool_name(tool));
        }
        for tool in &member.tools {
            tools.push(roster.taxonomy.tool_name(tool));
        }
        table.push_str(&format!(
            "|{}|{}|{}|{}|{}|\n",
            member.id,
            member.name,
            roles,
            tools.join(", "),
            member.sort_key(),
        ));
    }
    print_markdown(&table);
}

fn print_member(member: &Member, roster: &Roster) {
    println!(
        "{}{}",
        member.name,
        if member.is_lead { " (lead)" } else { "" }
    );
    println!("Id: {}", member.id);
    let roles = member
        .role_ids()
        .iter()
        .map(|rid| roster.taxonomy.role_name(rid))
        .collect::<Vec<_>>();
    if !roles.is_empty() {
        println!("Roles: {}", roles.join(", "));
    }
    let mut tools: Vec<String> = Vec::new();
    if let Some(tool) = member.tool.as_deref() {
        tools.push(roster.taxonomy.tool_name(tool));
    }
    for tool in &member.tools {
        tools.push(roster.taxonomy.tool_name(tool));
    }
    if !tools.is_empty() {
        println!("Tools: {}", tools.join(", "));
    }
    if !member.bio.is_empty() {
        println!("\nBio:");
        println!("{}", member.bio);
        println!("\nRendered:");
        println!("{}", bio::render(&member.bio));
    }
    if !member.links.is_empty() {
        println!("\nLinks:");
        for link in &member.links {
            println!("- {}: {}", link.label, link.url);
        }
    }
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn print_markdown(markdown: &str) {
    if stdout_is_tty() {
        let skin = MadSkin::default();
        let formatted = FmtText::from(&skin, markdown, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{markdown}");
    }
}
