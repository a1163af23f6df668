//! Paginated contact listing.
//!
//! Requests `/contacts`, then keeps following `links.next` until a page comes
//! back without one. Pages are fetched strictly one after another and the
//! result is all-or-nothing: any failure drops what was accumulated so far.

use tracing::{debug, info_span};

use crate::client::{InfluitiveClient, OP_LIST_CONTACTS};
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{Member, QueryFilter};

/// Fetch every member matching `filter`, in server order.
///
/// The filter only shapes the first request; continuation links are followed
/// verbatim. Records are neither filtered, sorted nor deduplicated locally.
pub fn fetch_all<T: Transport + ?Sized>(
    client: &InfluitiveClient,
    transport: &T,
    filter: Option<&QueryFilter>,
) -> Result<Vec<Member>, ApiError> {
    let _span = info_span!("fetch_all", filter = ?filter.map(|f| f.field.as_str())).entered();

    let mut members = Vec::new();
    let mut request = client.build_list_contacts(filter);
    let mut pages = 0usize;

    loop {
        let response = transport
            .execute(&request)
            .map_err(|source| ApiError::Transport { operation: OP_LIST_CONTACTS, source })?;
        let page = client.parse_contacts_page(response)?;
        pages += 1;
        debug!(page = pages, records = page.members.len(), "received contacts page");

        members.extend(page.members);
        match page.links.next_link() {
            Some(link) => request = client.build_next_page(link)?,
            None => break,
        }
    }

    debug!(pages, total = members.len(), "contact listing complete");
    Ok(members)
}
