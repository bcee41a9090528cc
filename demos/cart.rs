//! Example demonstrating the Cart Plugin
//!
//! A small marketplace: pick products from the catalog, adjust quantities in
//! the cart, and restart the app to see the cart restored from disk.
//!
//! Run with `RUST_LOG=debug` to watch the background writes.

use iced::widget::{button, column, row, scrollable, text};
use iced::{Element, Length, Subscription, Task};
use iced_cart_plugin::{CartInput, CartOutput, CartPlugin, CartView, Change, NewCartItem};
use iced_kv_store::AppName;
use iced_marketplace::{PluginHandle, PluginManager, PluginManagerBuilder, PluginMessage};
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    init_tracing();

    iced::application(App::new, App::update, App::view)
        .subscription(App::subscription)
        .run()
}

/// Logging defaults to `info`, override with `RUST_LOG`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn catalog() -> Vec<NewCartItem> {
    vec![
        NewCartItem::new("1", "Hello World T-shirt", "images/tshirt-hello-world.png", 29.9),
        NewCartItem::new("2", "Ruby on Rails T-shirt", "images/tshirt-rails.png", 49.9),
        NewCartItem::new("3", "Black Mug", "images/mug-black.png", 19.9),
    ]
}

struct App {
    plugins: PluginManager,
    cart: PluginHandle<CartPlugin>,
    catalog: Vec<NewCartItem>,
    // Driven by cart outputs; the cart itself is read from the plugin state
    status: String,
}

#[derive(Debug, Clone)]
enum Message {
    Plugin(PluginMessage),
    Cart(CartOutput),

    Add(usize),
    Increment(String),
    Decrement(String),
    Clear,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let app_name = AppName::new("com", "rocketseat", "gomarketplace");
        let mut builder = PluginManagerBuilder::new();
        let cart = builder.install(CartPlugin::new(app_name));
        let (plugins, init_task) = builder.build();

        let app = App {
            plugins,
            cart,
            catalog: catalog(),
            status: "Pick something from the catalog".to_string(),
        };

        (app, init_task.map(Message::Plugin))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let input = match message {
            Message::Plugin(plugin_msg) => {
                return self.plugins.update(plugin_msg).map(Message::Plugin);
            }

            Message::Cart(output) => {
                self.status = match output {
                    CartOutput::Loaded { items } if items.is_empty() => "Cart is empty".to_string(),
                    CartOutput::Loaded { items } => format!("Restored {} products", items.len()),
                    CartOutput::Changed { change, .. } => describe(change).to_string(),
                };
                return Task::none();
            }

            Message::Add(index) => match self.catalog.get(index) {
                Some(product) => CartInput::add(product.clone()),
                None => return Task::none(),
            },
            Message::Increment(id) => CartInput::increment(id),
            Message::Decrement(id) => CartInput::decrement(id),
            Message::Clear => CartInput::Clear,
        };

        self.cart.dispatch(input).map(Message::Plugin)
    }

    fn view(&self) -> Element<'_, Message> {
        let title = text("GoMarketplace").size(32);
        let status = text(format!("Status: {}", self.status)).size(14);

        let products = column(self.catalog.iter().enumerate().map(|(index, product)| {
            row![
                text(&product.title).width(240),
                text(format!("${:.2}", product.price)).width(100),
                button("Add").on_press(Message::Add(index)),
            ]
            .spacing(10)
            .into()
        }))
        .spacing(8);

        let cart: CartView = match CartView::new(&self.plugins) {
            Ok(cart) => cart,
            Err(error) => return text(error.to_string()).into(),
        };

        let lines = column(cart.items().into_iter().map(|item| {
            row![
                text(item.title.clone()).width(240),
                button("-").on_press(Message::Decrement(item.id.clone())),
                text(item.quantity.to_string()).width(30),
                button("+").on_press(Message::Increment(item.id.clone())),
                text(format!("${:.2}", item.line_total())),
            ]
            .spacing(10)
            .into()
        }))
        .spacing(8);

        let totals = cart.totals();
        let summary = row![
            text(format!("{} items", totals.total_quantity)),
            text(format!("Total ${:.2}", totals.subtotal)),
            button("Clear").on_press(Message::Clear),
        ]
        .spacing(20);

        let content = column![
            title,
            status,
            text("Products").size(20),
            products,
            text("Cart").size(20),
            lines,
            summary,
        ]
        .spacing(12)
        .padding(20);

        scrollable(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            self.plugins.subscriptions().map(Message::Plugin),
            self.cart.listen().map(Message::Cart),
        ])
    }
}

fn describe(change: Change) -> &'static str {
    match change {
        Change::Added => "Added to cart",
        Change::Incremented => "Quantity increased",
        Change::Decremented => "Quantity decreased",
        Change::Removed => "Removed from cart",
        Change::Cleared => "Cart cleared",
        Change::Replaced => "Cart reloaded",
        Change::Unchanged => "Nothing changed",
    }
}
