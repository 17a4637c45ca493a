use std::process;

use clap::{Arg, ArgMatches, Command};
use log::error;

use feria_market::catalog;
use feria_market::error::Result;
use feria_market::i18n::{translate, Language};
use feria_market::models::{RecordId, UserSummary};
use feria_market::pricing::Money;
use feria_market::Marketplace;

fn cli() -> Command<'static> {
    Command::new("feria-market")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Browse the student marketplace from the terminal")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("products")
                .about("List products, optionally filtered")
                .arg(
                    Arg::new("search")
                        .short('s')
                        .long("search")
                        .value_name("TERM")
                        .takes_value(true)
                        .help("Match name or description"),
                )
                .arg(
                    Arg::new("category")
                        .short('c')
                        .long("category")
                        .value_name("ID")
                        .takes_value(true)
                        .help("Only this category"),
                ),
        )
        .subcommand(
            Command::new("thread")
                .about("Print the comment thread of a product")
                .arg(Arg::new("product").value_name("PRODUCT_ID").required(true)),
        )
        .subcommand(
            Command::new("cart")
                .about("Show a user's cart and its totals")
                .arg(Arg::new("user").value_name("USER_ID").required(true)),
        )
        .subcommand(
            Command::new("fairs")
                .about("List fairs, or the fairs a user joined")
                .arg(
                    Arg::new("user")
                        .short('u')
                        .long("user")
                        .value_name("USER_ID")
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("say")
                .about("Print a UI string")
                .arg(Arg::new("key").value_name("KEY").required(true))
                .arg(
                    Arg::new("lang")
                        .short('l')
                        .long("lang")
                        .value_name("LANG")
                        .takes_value(true)
                        .possible_values(["es", "en"])
                        .default_value("es"),
                ),
        )
}

fn id_arg(matches: &ArgMatches, name: &str) -> RecordId {
    RecordId::from(matches.value_of(name).unwrap_or_default())
}

async fn products(market: &Marketplace, matches: &ArgMatches) -> Result<()> {
    let products = match matches.value_of("search") {
        Some(term) => market.products().search_remote(term).await?,
        None => market.products().list().await?,
    };
    let category = matches.value_of("category").map(RecordId::from);
    let visible: Vec<_> = catalog::in_category(&products, category.as_ref())
        .into_iter()
        .cloned()
        .collect();

    for product in catalog::sorted_by_name(&visible) {
        println!("{:>6}  {:<40} {:>10}", product.id, product.name, Money(product.price).to_string());
    }
    Ok(())
}

async fn thread(market: &Marketplace, matches: &ArgMatches) -> Result<()> {
    let product = id_arg(matches, "product");
    let thread = market.comments().thread_for_product(&product).await?;
    if thread.is_empty() {
        println!("{}", translate(Language::Es, "productDetail.noComments", None));
        return Ok(());
    }
    thread.walk(|item, depth| {
        let author = item
            .author
            .as_ref()
            .map(|author: &UserSummary| author.display_name())
            .filter(|name| !name.is_empty())
            .unwrap_or("anónimo");
        let stars = item.comment.rating.map(|r| "★".repeat(r as usize)).unwrap_or_default();
        println!("{}{} {}: {}", "  ".repeat(depth), stars, author, item.comment.text);
    });
    Ok(())
}

async fn cart(market: &Marketplace, matches: &ArgMatches) -> Result<()> {
    let user = id_arg(matches, "user");
    let items = market.cart().for_user(&user).await?;
    for item in &items {
        println!("{:>3} x {:<40} {:>10}", item.quantity, item.name, Money(item.line_total()).to_string());
    }
    let summary = market.price_rules().summarize(&items);
    println!("subtotal {:>10}", Money(summary.subtotal).to_string());
    println!("iva      {:>10}", Money(summary.tax).to_string());
    println!("envío    {:>10}", Money(summary.shipping).to_string());
    println!("total    {:>10}", Money(summary.total).to_string());
    Ok(())
}

async fn fairs(market: &Marketplace, matches: &ArgMatches) -> Result<()> {
    let (fairs, participations) = match matches.value_of("user") {
        Some(user) => {
            let user = RecordId::from(user);
            let fairs_service = market.fairs();
            let participations_service = market.participations();
            let (fairs, participations) =
                tokio::join!(fairs_service.list(), participations_service.for_user(&user));
            (fairs?, Some(participations?))
        }
        None => (market.fairs().list().await?, None),
    };

    let shown = match &participations {
        Some(participations) => catalog::fairs_joined(&fairs, participations),
        None => fairs.iter().collect(),
    };
    for fair in shown {
        let dates = match (fair.start_date, fair.end_date) {
            (Some(start), Some(end)) => format!("{} → {}", start, end),
            _ => String::new(),
        };
        let kind = fair.kind.map(|kind| kind.to_string()).unwrap_or_default();
        println!("{:>6}  {:<30} {:<10} {}", fair.id, fair.name, kind, dates);
    }
    Ok(())
}

async fn run(matches: ArgMatches) -> Result<()> {
    if let Some(("say", sub)) = matches.subcommand() {
        let language: Language = sub.value_of("lang").unwrap_or("es").parse()?;
        println!("{}", translate(language, sub.value_of("key").unwrap_or_default(), None));
        return Ok(());
    }

    let market = Marketplace::from_env()?;
    match matches.subcommand() {
        Some(("products", sub)) => products(&market, sub).await,
        Some(("thread", sub)) => thread(&market, sub).await,
        Some(("cart", sub)) => cart(&market, sub).await,
        Some(("fairs", sub)) => fairs(&market, sub).await,
        _ => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    if let Err(err) = run(cli().get_matches()).await {
        error!("{}", err);
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
