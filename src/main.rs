//! MYNY Storefront CLI
//!
//! Interactive surface over the cart engine and checkout flow: shop listing,
//! product view, slide-out cart panel, and the four-step checkout. Holds no
//! business state of its own; every mutation goes through the engine.

use anyhow::Result;
use myny_storefront::{
    Catalog, CartEngine, CheckoutFlow, CheckoutStep, Config, LineKey, ShippingMethod, StepStatus,
    StorefrontError,
};
use myny_storefront::storage::JsonFileStore;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let catalog = Catalog::seed();
    let mut cart = CartEngine::new(
        config.pricing.clone(),
        Box::new(JsonFileStore::new(&config.cart_path)),
    );
    if !cart.is_empty() {
        println!("Welcome back - {} item(s) still in your cart.", cart.total_items());
    }
    println!("MYNY streetwear. Type 'help' for commands.");

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = prompt(&mut input, "myny> ").await? else { break };
        let line = line.trim();
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("help") => print_help(),
            Some("shop") => render_shop(&catalog),
            Some("show") => match parts.next().and_then(|s| s.parse::<u32>().ok()) {
                Some(id) => render_product(&catalog, id),
                None => println!("usage: show <id>"),
            },
            Some("add") => {
                let id = parts.next().and_then(|s| s.parse::<u32>().ok());
                let size = parts.next();
                // An unparseable quantity becomes 0 so the engine rejects it.
                let qty = parts.next().map(|s| s.parse::<u32>().unwrap_or(0));
                add_to_cart(&catalog, &mut cart, id, size, qty);
            }
            Some("cart") => {
                cart.open();
                render_panel(&cart);
            }
            Some("close") => cart.close(),
            Some("remove") => match parts.next() {
                Some(key) => {
                    cart.remove(&LineKey::raw(key));
                    render_panel(&cart);
                }
                None => println!("usage: remove <line-key>"),
            },
            Some("qty") => {
                match (parts.next(), parts.next().and_then(|s| s.parse::<i64>().ok())) {
                    (Some(key), Some(n)) => {
                        cart.set_quantity(&LineKey::raw(key), n);
                        render_panel(&cart);
                    }
                    _ => println!("usage: qty <line-key> <quantity>"),
                }
            }
            Some("checkout") => run_checkout(&mut input, &mut cart, &config).await?,
            Some("quit") | Some("exit") => break,
            Some(other) => println!("unknown command '{other}', try 'help'"),
            None => {}
        }
        for event in cart.take_events() {
            tracing::debug!(?event, "cart event");
        }
    }
    Ok(())
}

fn print_help() {
    println!("  shop                 list the current drop");
    println!("  show <id>            product details");
    println!("  add <id> <size> [n]  add to cart");
    println!("  cart                 open the cart panel");
    println!("  close                close the cart panel");
    println!("  remove <line-key>    remove a line");
    println!("  qty <line-key> <n>   change a line quantity");
    println!("  checkout             start checkout");
    println!("  quit                 leave the store");
}

fn render_shop(catalog: &Catalog) {
    println!("-- THE DROP --");
    for p in catalog.all() {
        let tag = if p.limited { "  [LIMITED]" } else { "" };
        println!("  {:>2}  {:<24} {:>8}  {}{tag}", p.id, p.name, p.price.to_string(), p.category);
    }
}

fn render_product(catalog: &Catalog, id: u32) {
    // Unknown ids get a not-found notice, never an error into shared state.
    let p = match catalog.require(id) {
        Ok(p) => p,
        Err(e) => {
            println!("{e} (id {id}).");
            return;
        }
    };
    println!("{} - {}", p.name, p.price);
    if let Some(description) = &p.description {
        println!("  {description}");
    }
    for detail in &p.details {
        println!("  - {detail}");
    }
    if let Some(materials) = &p.materials {
        println!("  Materials: {materials}");
    }
    for care in &p.care {
        println!("  Care: {care}");
    }
    println!("  Sizes: {}", p.size_run().join(" / "));
    if !p.images.is_empty() {
        println!("  {} gallery shot(s)", p.images.len());
    }
}

fn add_to_cart(
    catalog: &Catalog,
    cart: &mut CartEngine,
    id: Option<u32>,
    size: Option<&str>,
    qty: Option<u32>,
) {
    let Some(product) = id.and_then(|id| catalog.get(id)) else {
        println!("Product not found. usage: add <id> <size> [qty]");
        return;
    };
    // Size selection is enforced here, at the surface, before anything
    // reaches the engine.
    let Some(size) = size.filter(|s| product.has_size(s)) else {
        println!("{} ({})", StorefrontError::SizeRequired, product.size_run().join(" / "));
        return;
    };
    match cart.add(product, size, qty.unwrap_or(1)) {
        Ok(()) => render_panel(cart),
        Err(e) => println!("{e}"),
    }
}

fn render_panel(cart: &CartEngine) {
    if !cart.is_open() {
        return;
    }
    println!("-- YOUR CART ({}) --", cart.total_items());
    if cart.is_empty() {
        println!("  Nothing here yet.");
        return;
    }
    for line in cart.lines() {
        println!(
            "  [{}] {} - size {} x{} = {}",
            line.line_key,
            line.product.name,
            line.selected_size,
            line.quantity,
            line.line_total()
        );
    }
    let remaining = cart.amount_until_free_shipping();
    if remaining.is_zero() {
        println!("  Free shipping unlocked!");
    } else {
        println!(
            "  {} away from free shipping ({:.0}%)",
            remaining,
            cart.free_shipping_progress()
        );
    }
    println!("  Subtotal {}   Shipping {}   Total {}", cart.subtotal(), cart.shipping_fee(), cart.total());
}

async fn run_checkout(input: &mut Input, cart: &mut CartEngine, config: &Config) -> Result<()> {
    let mut flow = match CheckoutFlow::begin(cart) {
        Ok(flow) => flow,
        Err(_) => {
            // Empty-cart notice instead of the step UI.
            println!("Your cart is empty. 'shop' to continue shopping.");
            return Ok(());
        }
    };

    loop {
        for event in flow.take_events() {
            tracing::debug!(?event, "checkout event");
        }
        render_progress(&flow);
        match flow.step() {
            CheckoutStep::Information => {
                println!("-- CONTACT & SHIPPING --");
                flow.form_mut().email = field(input, "email: ").await?;
                flow.form_mut().first_name = field(input, "first name: ").await?;
                flow.form_mut().last_name = field(input, "last name: ").await?;
                flow.form_mut().address = field(input, "address: ").await?;
                flow.form_mut().apartment = field(input, "apartment (optional): ").await?;
                flow.form_mut().city = field(input, "city: ").await?;
                flow.form_mut().state = field(input, "state: ").await?;
                flow.form_mut().zip = field(input, "zip: ").await?;
                flow.form_mut().phone = field(input, "phone: ").await?;
            }
            CheckoutStep::Shipping => {
                println!("-- SHIPPING METHOD --");
                let subtotal = cart.subtotal();
                for method in ShippingMethod::ALL {
                    let quote = method.quote(&subtotal, &config.pricing);
                    let price = if quote.is_zero() { "FREE".to_string() } else { quote.to_string() };
                    println!("  {:<10} {} ({}) - {price}", method.id(), method.label(), method.transit_time());
                }
                let raw = field(input, "method [standard]: ").await?;
                if let Some(method) = ShippingMethod::parse(raw.trim()) {
                    flow.form_mut().shipping_method = method;
                } else if !raw.trim().is_empty() {
                    println!("Unknown method, keeping {}.", flow.form().shipping_method.id());
                }
            }
            CheckoutStep::Payment => {
                println!("-- PAYMENT (simulated, nothing is charged) --");
                flow.form_mut().card_number = field(input, "card number: ").await?;
                flow.form_mut().card_name = field(input, "name on card: ").await?;
                flow.form_mut().card_expiry = field(input, "expiry (MM/YY): ").await?;
                flow.form_mut().card_cvc = field(input, "cvc: ").await?;
            }
            CheckoutStep::Review => {
                render_review(&flow, cart);
                let Some(choice) = prompt(input, "[place/back/abandon]: ").await? else {
                    return Ok(());
                };
                match choice.trim() {
                    "place" => {
                        println!("Processing...");
                        let confirmation = flow.submit_order(cart).await?;
                        println!("-- THANK YOU --");
                        println!("Your order has been placed successfully.");
                        println!("Order number: {}", confirmation.order_id);
                        println!("Placed at {}", confirmation.placed_at.format("%Y-%m-%d %H:%M UTC"));
                        return Ok(());
                    }
                    "back" => flow.back(),
                    "abandon" => return Ok(()),
                    _ => {}
                }
                continue;
            }
        }
        let Some(choice) = prompt(input, "[next/back/abandon]: ").await? else { return Ok(()) };
        match choice.trim() {
            "back" => flow.back(),
            "abandon" => return Ok(()),
            _ => flow.next(),
        }
    }
}

fn render_progress(flow: &CheckoutFlow) {
    let marks: Vec<String> = flow
        .progress()
        .iter()
        .map(|(step, status)| match status {
            StepStatus::Completed => format!("[x] {}", step.label()),
            StepStatus::Active => format!("[>] {}", step.label()),
            StepStatus::Upcoming => format!("[ ] {}", step.label()),
        })
        .collect();
    println!("{}", marks.join("  "));
}

fn render_review(flow: &CheckoutFlow, cart: &CartEngine) {
    let form = flow.form();
    println!("-- REVIEW YOUR ORDER --");
    println!("Ship to: {} {}, {}, {} {} {}",
        form.first_name, form.last_name, form.address, form.city, form.state, form.zip);
    println!("Method:  {} ({})", form.shipping_method.label(), form.shipping_method.transit_time());
    println!("Card:    **** **** **** {}", form.card_last4());
    for line in cart.lines() {
        println!("  {} - size {} x{} = {}",
            line.product.name, line.selected_size, line.quantity, line.line_total());
    }
    println!("Subtotal {}   Shipping {}   Total {}", cart.subtotal(), cart.shipping_fee(), cart.total());
}

/// Prompts and reads one line; `None` means the input stream ended.
async fn prompt(input: &mut Input, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

async fn field(input: &mut Input, label: &str) -> Result<String> {
    Ok(prompt(input, label).await?.unwrap_or_default())
}
