diesel::table! {
    support_tickets (ticket_id) {
        ticket_id -> Varchar,
        timestamp_utc -> Timestamptz,
        user_id -> Varchar,
        user_persona -> Nullable<Varchar>,
        client_firm_tier -> Int4,
        product_area -> Nullable<Varchar>,
        ticket_status -> Varchar,
        ticket_priority -> Varchar,
        ticket_subject -> Nullable<Text>,
        ticket_body -> Text,
    }
}

diesel::table! {
    enriched_feedback (enrichment_id) {
        enrichment_id -> Int4,
        ticket_id -> Varchar,
        processed_at_utc -> Timestamptz,
        feedback_category -> Nullable<Varchar>,
        detected_topics -> Nullable<Array<Text>>,
        sentiment_score -> Nullable<Float8>,
        priority_score -> Nullable<Float8>,
        mentioned_entities -> Nullable<Jsonb>,
        is_churn_risk -> Bool,
        llm_summary -> Nullable<Text>,
    }
}

diesel::joinable!(enriched_feedback -> support_tickets (ticket_id));

diesel::allow_tables_to_appear_in_same_query!(support_tickets, enriched_feedback);
