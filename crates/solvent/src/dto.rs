//! Flat wire representation of the entity tree.
//!
//! Sets collapse into `{liveSet: [...], tombstoneSet: [...]}` arrays and field
//! names are camelCase:
//!
//! ```json
//! {
//!   "id": "…",
//!   "toDoLists": {
//!     "liveSet": [{
//!       "id": "…",
//!       "title": { "value": "Groceries", "updatedAt": 1 },
//!       "toDoItems": {
//!         "liveSet": [{
//!           "id": "…", "title": "Milk", "checked": false,
//!           "orderValue": { "value": 10.0, "updatedAt": 1 }
//!         }],
//!         "tombstoneSet": []
//!       },
//!       "createdAt": 1
//!     }],
//!     "tombstoneSet": []
//!   },
//!   "createdAt": 1
//! }
//! ```
//!
//! Converting back into entities merges entries that appear twice under the
//! same id instead of letting the last one win.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::item::ToDoItem;
use crate::list::{ToDoList, ITEM_SET_TAG};
use crate::lww::{OrderValue, Title};
use crate::mergeable::Mergeable;
use crate::notebook::{Notebook, LIST_SET_TAG};
use crate::pset::PSet;

/// Wire form of [`OrderValue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderValueDto {
    pub value: f64,
    pub updated_at: i64,
}

/// Wire form of [`Title`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TitleDto {
    pub value: String,
    pub updated_at: i64,
}

/// Wire form of [`ToDoItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToDoItemDto {
    pub id: Uuid,
    pub title: String,
    pub checked: bool,
    pub order_value: OrderValueDto,
}

/// Wire form of a [`PSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PSetDto<T> {
    pub live_set: Vec<T>,
    pub tombstone_set: Vec<T>,
}

/// Wire form of [`ToDoList`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToDoListDto {
    pub id: Uuid,
    pub title: TitleDto,
    pub to_do_items: PSetDto<ToDoItemDto>,
    pub created_at: i64,
}

/// Wire form of [`Notebook`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotebookDto {
    pub id: Uuid,
    pub to_do_lists: PSetDto<ToDoListDto>,
    pub created_at: i64,
}

impl From<&OrderValue> for OrderValueDto {
    fn from(order_value: &OrderValue) -> Self {
        Self {
            value: order_value.value,
            updated_at: order_value.updated_at,
        }
    }
}

impl From<OrderValueDto> for OrderValue {
    fn from(dto: OrderValueDto) -> Self {
        OrderValue::with_timestamp(dto.value, dto.updated_at)
    }
}

impl From<&Title> for TitleDto {
    fn from(title: &Title) -> Self {
        Self {
            value: title.value.clone(),
            updated_at: title.updated_at,
        }
    }
}

impl From<TitleDto> for Title {
    fn from(dto: TitleDto) -> Self {
        Title::with_timestamp(dto.value, dto.updated_at)
    }
}

impl From<&ToDoItem> for ToDoItemDto {
    fn from(item: &ToDoItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            checked: item.checked,
            order_value: (&item.order_value).into(),
        }
    }
}

impl From<ToDoItemDto> for ToDoItem {
    fn from(dto: ToDoItemDto) -> Self {
        ToDoItem {
            id: dto.id,
            title: dto.title,
            checked: dto.checked,
            order_value: dto.order_value.into(),
        }
    }
}

impl<'a, T, D> From<&'a PSet<T>> for PSetDto<D>
where
    T: Mergeable,
    D: From<&'a T>,
{
    fn from(set: &'a PSet<T>) -> Self {
        Self {
            live_set: set.live_set().values().map(D::from).collect(),
            tombstone_set: set.tombstone_set().values().map(D::from).collect(),
        }
    }
}

impl From<&ToDoList> for ToDoListDto {
    fn from(list: &ToDoList) -> Self {
        Self {
            id: list.id(),
            title: list.title().into(),
            to_do_items: list.items().into(),
            created_at: list.created_at(),
        }
    }
}

impl TryFrom<ToDoListDto> for ToDoList {
    type Error = Error;

    fn try_from(dto: ToDoListDto) -> Result<Self, Error> {
        let items = PSet::from_parts(
            ITEM_SET_TAG,
            dto.to_do_items.live_set.into_iter().map(ToDoItem::from),
            dto.to_do_items.tombstone_set.into_iter().map(ToDoItem::from),
        )?;
        Ok(ToDoList::from_parts(
            dto.id,
            dto.title.into(),
            items,
            dto.created_at,
        ))
    }
}

impl From<&Notebook> for NotebookDto {
    fn from(notebook: &Notebook) -> Self {
        Self {
            id: notebook.id(),
            to_do_lists: notebook.lists().into(),
            created_at: notebook.created_at(),
        }
    }
}

impl TryFrom<NotebookDto> for Notebook {
    type Error = Error;

    fn try_from(dto: NotebookDto) -> Result<Self, Error> {
        let live = dto
            .to_do_lists
            .live_set
            .into_iter()
            .map(ToDoList::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let tombstones = dto
            .to_do_lists
            .tombstone_set
            .into_iter()
            .map(ToDoList::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let lists = PSet::from_parts(LIST_SET_TAG, live, tombstones)?;
        Ok(Notebook::from_parts(dto.id, lists, dto.created_at))
    }
}
