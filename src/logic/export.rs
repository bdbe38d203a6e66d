//! CSV export of a tournament's attendees.

use crate::bracket::Seat;
use crate::logic::TournamentError;
use crate::models::TournamentId;
use crate::store::Store;
use serde::Serialize;

#[derive(Serialize)]
struct ExportRow<'a> {
    name: &'a str,
    handle: &'a str,
    current_seat: Option<Seat>,
}

/// `name,handle,current_seat` rows, in registration order.
pub fn export_attendees<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    seeded_only: bool,
) -> Result<Vec<u8>, TournamentError> {
    let attendees = store.attendees(tournament_id, seeded_only)?;
    if attendees.is_empty() {
        return Err(TournamentError::NoRecords);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for a in &attendees {
        writer.serialize(ExportRow {
            name: &a.player.name,
            handle: &a.player.handle,
            current_seat: a.current_seat,
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| TournamentError::Csv(csv::Error::from(e.into_error())))
}
