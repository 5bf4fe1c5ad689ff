//! `ccnb` command line front end.
//!
//! # Responsibility
//! - Map subcommands onto one `Session` per invocation.
//! - Present core errors to the user; no domain rules live here.

use anyhow::{bail, Context, Result};
use ccnb_core::validate::parse_date;
use ccnb_core::{
    init_logging, log_level_from_env, upcoming_birthdays, upcoming_birthdays_from_today,
    ContactRecord, NoteRecord, Password, SecureStore, Session, Snapshot, StoreConfig, TerminalPrompt,
    DEFAULT_WINDOW_DAYS,
};
use clap::{Parser, Subcommand};
use log::warn;

#[derive(Parser)]
#[command(name = "ccnb")]
#[command(about = "Contact book and note book with optional encryption", version)]
struct Cli {
    /// Owner of the snapshot to open
    #[arg(short, long, default_value = "guest", global = true)]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new contact
    AddContact {
        name: String,
        #[arg(short, long = "phone")]
        phones: Vec<String>,
        /// Birthday as DD.MM.YYYY
        #[arg(short, long)]
        birthday: Option<String>,
        #[arg(short, long = "email")]
        emails: Vec<String>,
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Add a phone to a contact
    AddPhone { name: String, phone: String },

    /// Replace one of a contact's phones
    EditPhone {
        name: String,
        old: String,
        new: String,
    },

    /// Remove a phone from a contact
    RemovePhone { name: String, phone: String },

    /// Add an e-mail to a contact
    AddEmail { name: String, email: String },

    /// Replace one of a contact's e-mails
    EditEmail {
        name: String,
        old: String,
        new: String,
    },

    /// Remove an e-mail from a contact
    RemoveEmail { name: String, email: String },

    /// Set a contact's birthday (DD.MM.YYYY)
    SetBirthday { name: String, date: String },

    /// Set or clear a contact's address
    SetAddress {
        name: String,
        /// Omit to clear the address
        address: Option<String>,
    },

    /// Show one contact, or all when no name is given
    Show { name: Option<String> },

    /// Search contacts by any field
    Search { pattern: String },

    /// Delete a contact
    Delete { name: String },

    /// List congratulation dates in the coming days
    Birthdays {
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,
        /// Reference date as DD.MM.YYYY (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Add a note
    AddNote {
        title: String,
        content: String,
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Replace a note's content
    EditNote { title: String, content: String },

    /// Delete a note
    DeleteNote { title: String },

    /// Add tags to a note
    TagNote {
        title: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Remove a tag from a note
    UntagNote { title: String, tag: String },

    /// List all notes
    Notes,

    /// Search notes by keyword
    SearchNotes { keyword: String },

    /// List notes carrying every given tag
    NotesByTag {
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// List notes with the most tags first
    NotesByTagCount,

    /// List notes ordered alphabetically by their tags
    NotesSortedByTags,

    /// Protect the snapshot with a password
    SetPassword,

    /// Store the snapshot unencrypted
    ClearPassword,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = StoreConfig::from_env()?;

    let log_dir = config.base_dir().join("logs");
    if let Err(err) = init_logging(&log_level_from_env(), &log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let store = SecureStore::new(config);
    let mut session = Session::open(store, &cli.user, &mut TerminalPrompt)
        .with_context(|| format!("failed to open snapshot for `{}`", cli.user))?;

    if run(&mut session, cli.command)? {
        let path = session.save().context("failed to save snapshot")?;
        log::debug!("event=cli_save module=cli status=ok path={}", path.display());
    }
    Ok(())
}

/// Executes one command; returns whether the snapshot must be saved.
fn run(session: &mut Session, command: Commands) -> Result<bool> {
    let snapshot = session.snapshot_mut();
    match command {
        Commands::AddContact {
            name,
            phones,
            birthday,
            emails,
            address,
        } => {
            let mut record = ContactRecord::new(name)?;
            for phone in &phones {
                record.add_phone(phone)?;
            }
            for email in &emails {
                record.add_email(email)?;
            }
            if let Some(birthday) = birthday {
                record.set_birthday(&birthday)?;
            }
            if let Some(address) = address {
                record.set_address(address);
            }
            let name = record.name().to_string();
            snapshot.contacts.add(record)?;
            println!("Added {name}");
        }
        Commands::AddPhone { name, phone } => contact_mut(snapshot, &name)?.add_phone(&phone)?,
        Commands::EditPhone { name, old, new } => {
            contact_mut(snapshot, &name)?.edit_phone(&old, &new)?
        }
        Commands::RemovePhone { name, phone } => {
            contact_mut(snapshot, &name)?.remove_phone(&phone)?
        }
        Commands::AddEmail { name, email } => contact_mut(snapshot, &name)?.add_email(&email)?,
        Commands::EditEmail { name, old, new } => {
            contact_mut(snapshot, &name)?.edit_email(&old, &new)?
        }
        Commands::RemoveEmail { name, email } => {
            contact_mut(snapshot, &name)?.remove_email(&email)?
        }
        Commands::SetBirthday { name, date } => contact_mut(snapshot, &name)?.set_birthday(&date)?,
        Commands::SetAddress { name, address } => {
            let record = contact_mut(snapshot, &name)?;
            match address {
                Some(address) => record.set_address(address),
                None => record.clear_address(),
            }
        }
        Commands::Show { name: Some(name) } => {
            match snapshot.contacts.find(&name) {
                Some(record) => print_contact(record),
                None => bail!("contact `{name}` does not exist"),
            }
            return Ok(false);
        }
        Commands::Show { name: None } => {
            if snapshot.contacts.is_empty() {
                println!("No contacts");
            }
            snapshot.contacts.iter().for_each(print_contact);
            return Ok(false);
        }
        Commands::Search { pattern } => {
            let found = snapshot.contacts.search(&pattern);
            if found.is_empty() {
                println!("No contacts match `{pattern}`");
            }
            found.into_iter().for_each(print_contact);
            return Ok(false);
        }
        Commands::Delete { name } => {
            let removed = snapshot.contacts.delete(&name)?;
            println!("Deleted {}", removed.name());
        }
        Commands::Birthdays { days, date } => {
            let upcoming = match date {
                Some(raw) => upcoming_birthdays(&snapshot.contacts, parse_date(&raw)?, days),
                None => upcoming_birthdays_from_today(&snapshot.contacts, days),
            };
            if upcoming.is_empty() {
                println!("No birthdays in the next {days} days");
            }
            for entry in &upcoming {
                println!("{}: {}", entry.due_date_display(), entry.name);
            }
            return Ok(false);
        }
        Commands::AddNote {
            title,
            content,
            tags,
        } => {
            let mut note = NoteRecord::new(title, content)?;
            for tag in &tags {
                note.add_tag(tag);
            }
            snapshot.notes.add(note)?;
        }
        Commands::EditNote { title, content } => snapshot.notes.edit_content(&title, content)?,
        Commands::DeleteNote { title } => {
            snapshot.notes.delete(&title)?;
        }
        Commands::TagNote { title, tags } => {
            snapshot
                .notes
                .add_tags(&title, tags.iter().map(String::as_str))?
        }
        Commands::UntagNote { title, tag } => snapshot.notes.remove_tag(&title, &tag)?,
        Commands::Notes => {
            if snapshot.notes.is_empty() {
                println!("No notes");
            }
            snapshot.notes.iter().for_each(print_note);
            return Ok(false);
        }
        Commands::SearchNotes { keyword } => {
            snapshot.notes.search(&keyword).into_iter().for_each(print_note);
            return Ok(false);
        }
        Commands::NotesByTag { tags } => {
            let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
            snapshot.notes.with_tags(&tags).into_iter().for_each(print_note);
            return Ok(false);
        }
        Commands::NotesByTagCount => {
            snapshot.notes.sorted_by_tag_count().into_iter().for_each(print_note);
            return Ok(false);
        }
        Commands::NotesSortedByTags => {
            snapshot.notes.sorted_by_tags().into_iter().for_each(print_note);
            return Ok(false);
        }
        Commands::SetPassword => {
            let password = read_new_password()?;
            session.set_password(password);
            println!("Snapshot for {} will be stored encrypted", session.user());
        }
        Commands::ClearPassword => {
            if !session.is_protected() {
                warn!("event=cli_clear_password module=cli status=noop user={}", session.user());
            }
            session.clear_password();
            println!("Snapshot for {} will be stored unencrypted", session.user());
        }
    }
    Ok(true)
}

fn contact_mut<'a>(snapshot: &'a mut Snapshot, name: &str) -> Result<&'a mut ContactRecord> {
    snapshot
        .contacts
        .find_mut(name)
        .with_context(|| format!("contact `{name}` does not exist"))
}

fn read_new_password() -> Result<Password> {
    let first = Password::new(rpassword::prompt_password("New password: ")?);
    if first.is_empty() {
        bail!("password cannot be empty; use clear-password to store unencrypted");
    }
    let second = Password::new(rpassword::prompt_password("Repeat password: ")?);
    if first != second {
        bail!("passwords do not match");
    }
    Ok(first)
}

fn print_contact(record: &ContactRecord) {
    println!(
        "{}: phones: {}; birthday: {}; emails: {}; address: {}",
        record.name(),
        display_list(record.phones()),
        record.birthday_display().unwrap_or_else(|| "-".to_string()),
        display_list(record.emails()),
        record.address().unwrap_or("-"),
    );
}

fn print_note(note: &NoteRecord) {
    let tags: Vec<&str> = note.tags().collect();
    println!("[{}] {}", note.title(), note.content());
    if !tags.is_empty() {
        println!("    tags: {}", tags.join(", "));
    }
}

fn display_list(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
