use crate::config::AppConfig;
use crate::services::conversation::StateMachine;
use crate::services::render::TicketRenderer;

pub struct AppState {
    pub config: AppConfig,
    pub machine: StateMachine,
    pub renderer: Box<dyn TicketRenderer>,
}
