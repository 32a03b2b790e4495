//! Diesel schema for user persistence.

diesel::table! {
    /// Registered users.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Unique login name.
        #[max_length = 150]
        username -> Varchar,
        /// Role storage string (`admin` or `user`).
        #[max_length = 10]
        role -> Varchar,
        /// Whether the account may receive new tasks.
        is_active -> Bool,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}
