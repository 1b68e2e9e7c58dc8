/// `column=value` pair as typed by the user; values are resolved against
/// the table schema at execution time.
pub type Assignment = (String, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tables,

    Schema {
        table: String,
    },

    Create {
        table: String,
        columns: Vec<(String, String)>,
    },

    Insert {
        table: String,
        fields: Vec<Assignment>,
    },

    Select {
        table: String,
        filter: Vec<Assignment>,
    },

    Update {
        table: String,
        filter: Vec<Assignment>,
        assignments: Vec<Assignment>,
    },
}
