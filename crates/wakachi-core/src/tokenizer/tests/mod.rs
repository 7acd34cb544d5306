mod basic;
mod modes;
mod multi_path;
mod user_dict;
