use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::auth::{LoginForm, RegisterForm},
    response::ApiResponse,
    routes::{auth, cart, health, products},
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Shopyaar storefront"),
    paths(
        health::health_check,
        products::index,
        products::product_detail,
        cart::add_to_cart,
        cart::cart,
        cart::checkout,
        auth::register_form,
        auth::register,
        auth::login_form,
        auth::login,
        auth::logout
    ),
    components(
        schemas(
            health::HealthData,
            ApiResponse<health::HealthData>,
            RegisterForm,
            LoginForm
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Storefront", description = "Product pages"),
        (name = "Cart", description = "Cart and checkout pages, sign-in required"),
        (name = "Auth", description = "Registration and session endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
