use crate::contract::model::Press;
use crate::infra::storage::entity::PressRow;

pub fn entity_to_contract(row: PressRow) -> Press {
    Press {
        user_id: row.user_id,
        time_millis: row.time_pressed,
    }
}
