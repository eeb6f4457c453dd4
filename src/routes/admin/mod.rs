mod handler;
mod model;

pub use handler::{
    add_user,
    delete_user,
    get_user,
    list_inbounds,
    list_users,
    reset_usage,
    update_user,
};
pub use model::{ClientMutationResponse, UserListResponse};
