pub mod failure_json_mw;
pub mod request_id_mw;
