use serde::Serialize;

use crate::links::{AlbumButton, LinkSet, ResolvedSong};

const ROW_WIDTH: usize = 3;

pub const MORE_LABEL: &str = "More options ▾";
pub const LESS_LABEL: &str = "◀ Fewer options";
pub const ALBUM_HEADER_LABEL: &str = "💿 Album";
pub const PREV_PAGE_LABEL: &str = "◀";
pub const NEXT_PAGE_LABEL: &str = "▶";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Button {
    Url { label: String, url: String },
    Callback { label: String, data: String },
}

impl Button {
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Url {
            label: label.into(),
            url: url.into(),
        }
    }

    pub fn callback(label: impl Into<String>, data: &CallbackData) -> Self {
        Self::Callback {
            label: label.into(),
            data: data.encode(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Url { label, .. } | Self::Callback { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ButtonGrid {
    pub rows: Vec<Vec<Button>>,
}

impl ButtonGrid {
    fn push_row(&mut self, row: Vec<Button>) {
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    fn push_wrapped(&mut self, buttons: impl IntoIterator<Item = Button>) {
        let buttons: Vec<Button> = buttons.into_iter().collect();
        for chunk in buttons.chunks(ROW_WIDTH) {
            self.push_row(chunk.to_vec());
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Non-interactive header or page indicator.
    Noop,
    More,
    Less,
    /// Requested page; may be out of range, the grid clamps it.
    Page(i64),
}

/// Payload of a callback button: `action|token[|page]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    pub action: CallbackAction,
    pub token: String,
}

impl CallbackData {
    pub fn new(action: CallbackAction, token: impl Into<String>) -> Self {
        Self {
            action,
            token: token.into(),
        }
    }

    pub fn encode(&self) -> String {
        match self.action {
            CallbackAction::Noop => format!("noop|{}", self.token),
            CallbackAction::More => format!("more|{}", self.token),
            CallbackAction::Less => format!("less|{}", self.token),
            CallbackAction::Page(page) => format!("page|{}|{}", self.token, page),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.split('|');
        let action = parts.next()?;
        let token = parts.next().filter(|token| !token.is_empty())?;
        let page = parts.next();
        if parts.next().is_some() {
            return None;
        }

        let action = match (action, page) {
            ("noop", None) => CallbackAction::Noop,
            ("more", None) => CallbackAction::More,
            ("less", None) => CallbackAction::Less,
            ("page", Some(page)) => CallbackAction::Page(page.parse().ok()?),
            _ => return None,
        };
        Some(Self::new(action, token))
    }
}

/// Platform grid for one resolved link set.
///
/// Collapsed shows favorites only; the toggle row appears when collapsed with
/// hidden platforms ("more") or when expanded ("less").
pub fn build_track_grid(
    links: &LinkSet,
    expanded: bool,
    token: &str,
    album_buttons: &[AlbumButton],
) -> ButtonGrid {
    let mut grid = ButtonGrid::default();

    grid.push_wrapped(
        links
            .sorted_entries()
            .into_iter()
            .filter(|entry| expanded || entry.platform.is_favorite())
            .map(|entry| Button::url(entry.platform.display_name(), &entry.url)),
    );

    if !album_buttons.is_empty() {
        grid.push_row(vec![Button::callback(
            ALBUM_HEADER_LABEL,
            &CallbackData::new(CallbackAction::Noop, token),
        )]);
        grid.push_wrapped(
            album_buttons
                .iter()
                .map(|album| Button::url(&album.label, &album.url)),
        );
    }

    if expanded {
        grid.push_row(vec![Button::callback(
            LESS_LABEL,
            &CallbackData::new(CallbackAction::Less, token),
        )]);
    } else if links.has_hidden_platforms() {
        grid.push_row(vec![Button::callback(
            MORE_LABEL,
            &CallbackData::new(CallbackAction::More, token),
        )]);
    }

    grid
}

pub fn page_count(items: usize, page_size: usize) -> usize {
    items.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(requested: i64, page_count: usize) -> usize {
    let last = page_count.saturating_sub(1);
    usize::try_from(requested.max(0)).map_or(last, |page| page.min(last))
}

/// One page of a resolved setlist. Out-of-range pages clamp to the first or
/// last page; navigation buttons clamp as well instead of wrapping.
pub fn build_setlist_grid(
    songs: &[ResolvedSong],
    token: &str,
    requested_page: i64,
    page_size: usize,
) -> ButtonGrid {
    let page_size = page_size.max(1);
    let pages = page_count(songs.len(), page_size);
    let page = clamp_page(requested_page, pages);
    let noop = CallbackData::new(CallbackAction::Noop, token);

    let mut grid = ButtonGrid::default();
    for (index, song) in songs
        .iter()
        .enumerate()
        .skip(page * page_size)
        .take(page_size)
    {
        let mut title = format!("{}. {}", index + 1, song.title);
        if song.links.is_empty() {
            title.push_str(" (no links)");
        }
        grid.push_row(vec![Button::callback(title, &noop)]);

        let favorites: Vec<Button> = song
            .links
            .sorted_entries()
            .into_iter()
            .filter(|entry| entry.platform.is_favorite())
            .map(|entry| Button::url(entry.platform.display_name(), &entry.url))
            .collect();
        if favorites.is_empty() {
            if let Some(page_url) = &song.page_url {
                grid.push_row(vec![Button::url("song.link", page_url)]);
            }
        } else {
            grid.push_wrapped(favorites);
        }
    }

    if pages > 1 {
        let prev = page.saturating_sub(1);
        let next = (page + 1).min(pages - 1);
        grid.push_row(vec![
            Button::callback(
                PREV_PAGE_LABEL,
                &CallbackData::new(CallbackAction::Page(prev as i64), token),
            ),
            Button::callback(format!("page {}/{}", page + 1, pages), &noop),
            Button::callback(
                NEXT_PAGE_LABEL,
                &CallbackData::new(CallbackAction::Page(next as i64), token),
            ),
        ]);
    }

    grid
}
