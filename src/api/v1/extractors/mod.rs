pub mod path_id;
