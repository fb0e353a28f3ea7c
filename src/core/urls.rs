#[derive(Debug)]
pub struct ApiUrls;

impl ApiUrls {
    // Health
    pub const HEALTH: &'static str = "/api/health";

    // Tickets - JSON APIs
    pub const TICKETS: &'static str = "/api/tickets";
    pub const TICKETS_SEARCH: &'static str = "/api/tickets/search";
    pub const TICKETS_ENRICHED: &'static str = "/api/tickets/enriched";
    pub const TICKET_BY_ID: &'static str = "/api/tickets/:ticket_id";
    pub const TICKET_ENRICH: &'static str = "/api/tickets/:ticket_id/enrich";

    // Analytics - JSON APIs
    pub const ANALYTICS: &'static str = "/api/analytics";

    // Explorer - HTML fragments
    pub const UI_EXPLORER: &'static str = "/api/ui/explorer";
    pub const UI_EXPLORER_VIEW: &'static str = "/api/ui/explorer/view";
    pub const UI_EXPLORER_SENTIMENT: &'static str = "/api/ui/explorer/sentiment";
}
