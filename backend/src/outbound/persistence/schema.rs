//! Diesel table definitions mirroring `backend/migrations`.

diesel::table! {
    /// Scholarship records.
    scholarships (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        /// Decimal EDU amount stored as text.
        amount -> Text,
        status -> Text,
        recipient -> Nullable<Text>,
        applicants -> Array<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student applications, unique per scholarship and applicant.
    applications (id) {
        id -> Uuid,
        scholarship_id -> Uuid,
        applicant_address -> Text,
        status -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(applications -> scholarships (scholarship_id));
diesel::allow_tables_to_appear_in_same_query!(applications, scholarships);
