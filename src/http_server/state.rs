use crate::services::relay::RelayService;

pub struct AppState {
    pub relay: RelayService,
}
