//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Short summary.
        #[max_length = 200]
        title -> Varchar,
        /// Free-form details, possibly empty.
        description -> Text,
        /// Due instant.
        due_date -> Timestamptz,
        /// Workflow status storage string.
        #[max_length = 20]
        status -> Varchar,
        /// Priority storage string.
        #[max_length = 10]
        priority -> Varchar,
        /// Assignee, references `users.id`.
        assigned_to -> Uuid,
        /// Creator, references `users.id`.
        created_by -> Uuid,
        /// Optimistic concurrency counter.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments on tasks.
    task_comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Commented task, cascades on delete.
        task_id -> Uuid,
        /// Author, references `users.id`.
        author_id -> Uuid,
        /// Comment body.
        content -> Text,
        /// Posting timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only task audit trail.
    task_history (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Insertion order, assigned by the database.
        sequence -> Int8,
        /// Task the entry describes, cascades on delete.
        task_id -> Uuid,
        /// Acting user, references `users.id`.
        actor_id -> Uuid,
        /// Action storage string.
        #[max_length = 20]
        action -> Varchar,
        /// Human-readable description.
        description -> Text,
        /// Recording timestamp.
        recorded_at -> Timestamptz,
    }
}

diesel::joinable!(task_comments -> tasks (task_id));
diesel::joinable!(task_history -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_comments, task_history);
