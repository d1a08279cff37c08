//! Customer management commands.

use secrecy::SecretString;

use emporium_api::db::PgStore;
use emporium_api::schema::{CreateCustomerInput, DeleteCustomerInput, Mutation};

use super::{CommandError, connect};

/// Create a customer.
///
/// Without `password` the customer gets a random one they must reset.
pub async fn create(
    email: String,
    username: String,
    phone: Option<String>,
    password: Option<SecretString>,
) -> Result<(), CommandError> {
    let store = PgStore::new(connect().await?);

    let result = Mutation::new(&store)
        .create_customer(CreateCustomerInput {
            email,
            username,
            phone,
            password,
        })
        .await?;

    tracing::info!("{}", result.message);
    Ok(())
}

/// Delete a customer and their orders.
pub async fn delete(email: String) -> Result<(), CommandError> {
    let store = PgStore::new(connect().await?);

    let result = Mutation::new(&store)
        .delete_customer(DeleteCustomerInput { email })
        .await?;

    if !result.success {
        return Err(CommandError::Unsuccessful(result.message));
    }
    tracing::info!("{}", result.message);
    Ok(())
}
