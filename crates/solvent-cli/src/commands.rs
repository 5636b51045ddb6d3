use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use solvent::dto::NotebookDto;
use solvent::{Notebook, ToDoList};
use solvent_store::{NotebookService, SqliteRepository};
use uuid::Uuid;

pub type Result = std::result::Result<(), Box<dyn std::error::Error>>;

pub type Service = NotebookService<SqliteRepository>;

pub fn open_service(db_path: &Path) -> std::result::Result<Service, Box<dyn std::error::Error>> {
    let repository = SqliteRepository::open(db_path)?;
    Ok(NotebookService::new(repository))
}

/// `solvent new`: Create an empty notebook.
pub fn new_notebook(service: &Service) -> Result {
    let notebook = service.create()?;
    println!("{}", notebook.id());
    Ok(())
}

/// `solvent list`: List stored notebooks.
pub fn list(service: &Service) -> Result {
    let ids = service.ids()?;
    if ids.is_empty() {
        println!("  (no notebooks)");
        return Ok(());
    }

    println!("  {:<36}  {:<20}  {:>5}", "Notebook", "Created", "Lists");
    println!("  {}", "-".repeat(65));
    for id in ids {
        let notebook = service.fetch(id)?;
        println!(
            "  {:<36}  {:<20}  {:>5}",
            id,
            format_timestamp(notebook.created_at()),
            notebook.get_lists().len()
        );
    }
    Ok(())
}

/// `solvent show <notebook>`: Print lists and items in display order.
pub fn show(service: &Service, notebook_id: Uuid) -> Result {
    let notebook = service.fetch(notebook_id)?;
    println!(
        "Notebook {} (created {})",
        notebook.id(),
        format_timestamp(notebook.created_at())
    );

    let mut lists = notebook.get_lists();
    if lists.is_empty() {
        println!("  (no lists)");
        return Ok(());
    }
    lists.sort_by_key(|list| list.created_at());

    for list in lists {
        println!();
        print_list(list);
    }
    Ok(())
}

fn print_list(list: &ToDoList) {
    println!("{}  [{}]", list.title().value, list.id());
    let items = list.sorted_items();
    if items.is_empty() {
        println!("  (empty)");
    }
    for (position, item) in items.iter().enumerate() {
        let mark = if item.checked { "x" } else { " " };
        println!(
            "  {:>3}. [{mark}] {:<30} {}",
            position,
            truncate(&item.title, 30),
            item.id
        );
    }
}

/// `solvent add-list <notebook> <title>`
pub fn add_list(service: &Service, notebook_id: Uuid, title: &str) -> Result {
    let id = edit(service, notebook_id, |notebook| {
        Ok(notebook.add_list(title)?.id())
    })?;
    println!("{id}");
    Ok(())
}

/// `solvent remove-list <notebook> <list>`
pub fn remove_list(service: &Service, notebook_id: Uuid, list_id: Uuid) -> Result {
    edit(service, notebook_id, |notebook| {
        notebook.get_list(list_id)?;
        notebook.remove_list(list_id);
        Ok(())
    })
}

/// `solvent rename-list <notebook> <list> <title>`
pub fn rename_list(service: &Service, notebook_id: Uuid, list_id: Uuid, title: &str) -> Result {
    edit(service, notebook_id, |notebook| {
        notebook.get_list_mut(list_id)?.rename(title);
        Ok(())
    })
}

/// `solvent add-item <notebook> <list> <title>`
pub fn add_item(service: &Service, notebook_id: Uuid, list_id: Uuid, title: &str) -> Result {
    let id = edit(service, notebook_id, |notebook| {
        Ok(notebook.get_list_mut(list_id)?.add_item(title)?)
    })?;
    println!("{id}");
    Ok(())
}

/// `solvent remove-item <notebook> <list> <item>`
pub fn remove_item(service: &Service, notebook_id: Uuid, list_id: Uuid, item_id: Uuid) -> Result {
    edit(service, notebook_id, |notebook| {
        let list = notebook.get_list_mut(list_id)?;
        list.get_item(item_id)?;
        list.remove_item(item_id);
        Ok(())
    })
}

/// `solvent check <notebook> <list> <item>`
pub fn check(service: &Service, notebook_id: Uuid, list_id: Uuid, item_id: Uuid) -> Result {
    edit(service, notebook_id, |notebook| {
        notebook.get_list_mut(list_id)?.check_item(item_id)?;
        Ok(())
    })
}

/// `solvent uncheck <notebook> <list> <item>`: Prints the item's new id.
pub fn uncheck(service: &Service, notebook_id: Uuid, list_id: Uuid, item_id: Uuid) -> Result {
    let id = edit(service, notebook_id, |notebook| {
        Ok(notebook.get_list_mut(list_id)?.uncheck_item(item_id)?)
    })?;
    println!("{id}");
    Ok(())
}

/// `solvent move <notebook> <list> <item> <index>`
pub fn move_item(
    service: &Service,
    notebook_id: Uuid,
    list_id: Uuid,
    item_id: Uuid,
    index: usize,
) -> Result {
    edit(service, notebook_id, |notebook| {
        notebook.get_list_mut(list_id)?.move_item(item_id, index)?;
        Ok(())
    })
}

/// `solvent export <notebook>`: Dump a notebook as JSON.
pub fn export(service: &Service, notebook_id: Uuid, output: Option<&Path>) -> Result {
    let notebook = service.fetch(notebook_id)?;
    let json = serde_json::to_string_pretty(&NotebookDto::from(&notebook))?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            tracing::info!(notebook = %notebook_id, path = %path.display(), "exported notebook");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// `solvent merge <file>`: Merge an exported notebook into the database.
///
/// A notebook the database has never seen is stored as is.
pub fn merge(service: &Service, file: &Path) -> Result {
    let data = fs::read_to_string(file)?;
    let dto: NotebookDto = serde_json::from_str(&data)?;
    let incoming = Notebook::try_from(dto)?;

    let merged = service.merge_or_store(&incoming)?;

    println!(
        "Merged notebook {} ({} lists)",
        merged.id(),
        merged.get_lists().len()
    );
    Ok(())
}

/// Load a notebook, apply a local edit, and write it back through the
/// service so the stored state is merged rather than replaced.
fn edit<T, F>(service: &Service, notebook_id: Uuid, f: F) -> std::result::Result<T, Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Notebook) -> std::result::Result<T, Box<dyn std::error::Error>>,
{
    let mut notebook = service.fetch(notebook_id)?;
    let value = f(&mut notebook)?;
    service.update(&notebook)?;
    Ok(value)
}

fn format_timestamp(nanos: i64) -> String {
    let secs = nanos.div_euclid(1_000_000_000);
    let subsec = nanos.rem_euclid(1_000_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, subsec)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| nanos.to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{cut}...")
    }
}
