//! The storefront page: one template whose body is selected by a [`PageTag`].

use askama::Template;
use askama_web::WebTemplate;

use crate::{
    dto::{auth::FormErrors, cart::CartView},
    models::{CurrentUser, Product},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTag {
    Home,
    Product,
    Cart,
    Checkout,
    Auth,
}

impl PageTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageTag::Home => "home",
            PageTag::Product => "product",
            PageTag::Cart => "cart",
            PageTag::Checkout => "checkout",
            PageTag::Auth => "auth",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Register,
    Login,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Register => "Register",
            AuthMode::Login => "Log in",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            AuthMode::Register => "/register/",
            AuthMode::Login => "/login/",
        }
    }
}

/// Context for the `auth` page.
#[derive(Debug, Clone)]
pub struct AuthFormView {
    pub mode: AuthMode,
    pub username: String,
    pub next: Option<String>,
    pub errors: FormErrors,
}

impl AuthFormView {
    pub fn blank(mode: AuthMode, next: Option<String>) -> Self {
        Self {
            mode,
            username: String::new(),
            next,
            errors: FormErrors::default(),
        }
    }

    pub fn is_register(&self) -> bool {
        self.mode == AuthMode::Register
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "storefront.html")]
pub struct StorefrontTemplate {
    pub page: PageTag,
    pub user: Option<CurrentUser>,
    pub products: Vec<Product>,
    pub product: Option<Product>,
    pub cart: Option<CartView>,
    pub auth: Option<AuthFormView>,
}

impl StorefrontTemplate {
    fn base(page: PageTag, user: Option<CurrentUser>) -> Self {
        Self {
            page,
            user,
            products: Vec::new(),
            product: None,
            cart: None,
            auth: None,
        }
    }

    pub fn home(user: Option<CurrentUser>, products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::base(PageTag::Home, user)
        }
    }

    pub fn product(user: Option<CurrentUser>, product: Product) -> Self {
        Self {
            product: Some(product),
            ..Self::base(PageTag::Product, user)
        }
    }

    pub fn cart(user: CurrentUser, cart: CartView) -> Self {
        Self {
            cart: Some(cart),
            ..Self::base(PageTag::Cart, Some(user))
        }
    }

    /// Confirmation for an order that was just completed.
    pub fn checkout(user: CurrentUser, order: CartView) -> Self {
        Self {
            cart: Some(order),
            ..Self::base(PageTag::Checkout, Some(user))
        }
    }

    pub fn auth(user: Option<CurrentUser>, form: AuthFormView) -> Self {
        Self {
            auth: Some(form),
            ..Self::base(PageTag::Auth, user)
        }
    }

    pub fn title(&self) -> &'static str {
        match (&self.page, &self.auth) {
            (PageTag::Home, _) => "Products",
            (PageTag::Product, _) => "Product",
            (PageTag::Cart, _) => "Your cart",
            (PageTag::Checkout, _) => "Order placed",
            (PageTag::Auth, Some(form)) => form.mode.title(),
            (PageTag::Auth, None) => "Account",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::{dto::cart::CartLine, models::Order};

    fn product() -> Product {
        Product {
            id: 7,
            name: "Chai Mug".into(),
            description: "Holds <hot> tea".into(),
            price: Decimal::new(1250, 2),
            created_at: Utc::now(),
        }
    }

    fn shopper() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "asha".into(),
        }
    }

    #[test]
    fn product_page_shows_name_description_and_price() {
        let html = StorefrontTemplate::product(None, product()).render().unwrap();
        assert!(html.contains("data-page=\"product\""));
        assert!(html.contains("Chai Mug"));
        assert!(html.contains("Holds &#60;hot&#62; tea") || html.contains("Holds &lt;hot&gt; tea"));
        assert!(html.contains("12.50"));
        assert!(html.contains("/add/7/"));
    }

    #[test]
    fn home_page_links_each_product() {
        let html = StorefrontTemplate::home(Some(shopper()), vec![product()])
            .render()
            .unwrap();
        assert!(html.contains("data-page=\"home\""));
        assert!(html.contains("/product/7/"));
        assert!(html.contains("asha"));
    }

    #[test]
    fn cart_page_renders_lines_and_total() {
        let cart = CartView {
            order: Order {
                id: 1,
                user_id: Uuid::new_v4(),
                created_at: Utc::now(),
                completed: false,
            },
            lines: vec![
                CartLine {
                    item_id: 1,
                    product_id: 7,
                    name: "Chai Mug".into(),
                    unit_price: Decimal::new(1000, 2),
                    quantity: 2,
                },
                CartLine {
                    item_id: 2,
                    product_id: 8,
                    name: "Coaster".into(),
                    unit_price: Decimal::new(500, 2),
                    quantity: 1,
                },
            ],
        };
        let html = StorefrontTemplate::cart(shopper(), cart).render().unwrap();
        assert!(html.contains("data-page=\"cart\""));
        assert!(html.contains("20.00"));
        assert!(html.contains("25.00"));
        assert!(html.contains("/checkout/"));
    }

    #[test]
    fn auth_page_shows_field_errors() {
        let mut form = AuthFormView::blank(AuthMode::Register, None);
        form.username = "taken".into();
        form.errors.username.push("A user with that username already exists.".into());
        let html = StorefrontTemplate::auth(None, form).render().unwrap();
        assert!(html.contains("data-page=\"auth\""));
        assert!(html.contains("action=\"/register/\""));
        assert!(html.contains("A user with that username already exists."));
        assert!(html.contains("value=\"taken\""));
    }
}
