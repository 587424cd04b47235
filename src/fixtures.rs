//! Hand-built rosters shared by the unit tests.

use crate::models::{Roster, ShiftCode, Team};

use ShiftCode::{Close1215 as L, Full as F, Leave as B, Open1845 as E};

/// A four-person week (M.S., M.S.Y., G.T., PER.) that satisfies every rule
/// under the default configuration.
///
/// ```text
///          Mon  Tue  Wed  Thu  Fri  Sat  Sun
/// M.S.     B    L    F    E    E    E    E     52.5h
/// M.S.Y.   F    E    B    L    L    L    L     49.5h
/// G.T.     E    B    L    F    E    E    E     52.5h
/// PER.     L    F    E    B    L    L    L     49.5h
/// ```
pub(crate) fn valid_week() -> (Team, Roster) {
    let roster = Roster::from_rows(&[
        [B, L, F, E, E, E, E],
        [F, E, B, L, L, L, L],
        [E, B, L, F, E, E, E],
        [L, F, E, B, L, L, L],
    ]);
    (Team::default(), roster)
}
