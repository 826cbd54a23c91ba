//! Season and episode list extraction for streaming pages.
//!
//! A title page carries two lists under `#stream`: the season tabs followed
//! by the episode tabs of the selected season. Only tabs whose label is a
//! number are kept, so entries such as "Filme" are dropped.

use crate::error::ParseError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use shared::{PageInfo, PageLink};

static STREAM_LISTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#stream ul").expect("valid selector"));
static ITEM_ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li a").expect("valid selector"));

/// Parse the season and episode lists of a streaming page
pub fn parse_page(html: &str) -> Result<PageInfo, ParseError> {
    let document = Html::parse_document(html);
    let lists: Vec<ElementRef> = document.select(&STREAM_LISTS).take(2).collect();

    let [season_list, episode_list] = lists.as_slice() else {
        return Err(ParseError::MissingContainers { found: lists.len() });
    };

    Ok(PageInfo {
        seasons: numbered_links(*season_list),
        episodes: numbered_links(*episode_list),
    })
}

fn numbered_links(list: ElementRef) -> Vec<PageLink> {
    list.select(&ITEM_ANCHORS)
        .filter_map(|anchor| {
            let num = anchor.text().collect::<String>().trim().parse().ok()?;
            let link = anchor.value().attr("href")?.to_string();
            Some(PageLink { num, link })
        })
        .collect()
}
