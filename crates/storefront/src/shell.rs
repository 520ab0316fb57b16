//! Interactive command shell.
//!
//! Each input line is split like a POSIX shell would (so quoted product names
//! survive) and parsed with clap. Commands run against [`AppState`] and write
//! views to the terminal.

use std::io::{self, BufRead, Write};

use clap::{CommandFactory, Parser, Subcommand};
use estore_core::{CartItemId, Category, ProductId};
use thiserror::Error;

use crate::admin::ProductForm;
use crate::interaction::Terminal;
use crate::state::{AppState, View};
use crate::views::{CartView, render_home, render_orders, render_products};

const PROMPT: &str = "estore>";

/// One parsed input line.
#[derive(Debug, Parser)]
#[command(
    name = "estore",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

/// Shell commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ShellCommand {
    /// Show the home view: categories and featured products
    Home,
    /// List products, optionally filtered by category ("all" for every product)
    Products { category: Option<String> },
    /// Show the cart
    Cart,
    /// Add one unit of a product to the cart
    Add { product_id: ProductId },
    /// Remove a line from the cart
    Remove { item_id: CartItemId },
    /// Place an order for the whole cart
    Checkout,
    /// Switch view (home, products, cart, admin)
    View { name: View },
    /// Reload and list orders
    Orders,
    /// Create a product
    CreateProduct {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        image_url: String,
        #[arg(long, default_value = "")]
        stock: String,
    },
    /// Delete a product (asks for confirmation)
    DeleteProduct { product_id: ProductId },
    /// Reload products and the cart
    Refresh,
    /// Show this help
    Help,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Errors turning an input line into a command.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Split(#[from] shell_words::ParseError),
    #[error("{0}")]
    Command(#[from] clap::Error),
}

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns an error for unbalanced quotes or an unknown or malformed command.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, ParseError> {
    let words = shell_words::split(line)?;
    if words.is_empty() {
        return Ok(None);
    }
    let parsed = ShellLine::try_parse_from(words)?;
    Ok(Some(parsed.command))
}

/// Help text listing every command.
#[must_use]
pub fn help_text() -> String {
    ShellLine::command().render_help().to_string()
}

/// Read commands until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or written.
pub async fn run<R: BufRead, W: Write>(
    state: &mut AppState,
    term: &mut Terminal<R, W>,
) -> io::Result<()> {
    render_view(state, term.output())?;

    loop {
        write!(term.output(), "{PROMPT} ")?;
        term.output().flush()?;

        let Some(line) = term.read_line()? else {
            writeln!(term.output())?;
            break;
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "Unparsable input");
                writeln!(term.output(), "{}", e.to_string().trim_end())?;
                continue;
            }
        };

        if execute(state, term, command).await? == Flow::Quit {
            break;
        }
    }

    tracing::info!("Shell closed");
    Ok(())
}

/// Run one command.
///
/// Backend failures have already been logged and shown to the user by the
/// time an action returns, so they are not propagated.
///
/// # Errors
///
/// Returns an error if writing to the terminal fails.
pub async fn execute<R: BufRead, W: Write>(
    state: &mut AppState,
    term: &mut Terminal<R, W>,
    command: ShellCommand,
) -> io::Result<Flow> {
    match command {
        ShellCommand::Home => {
            state.set_view(View::Home).await;
            render_view(state, term.output())?;
        }
        ShellCommand::Products { category } => {
            let filter = match category.as_deref() {
                None => None,
                Some(raw) if raw.eq_ignore_ascii_case("all") => None,
                Some(raw) => match raw.parse::<Category>() {
                    Ok(c) => Some(c),
                    Err(e) => {
                        writeln!(term.output(), "{e}")?;
                        return Ok(Flow::Continue);
                    }
                },
            };
            state.select_category(filter);
            render_view(state, term.output())?;
        }
        ShellCommand::Cart => {
            state.set_view(View::Cart).await;
            render_view(state, term.output())?;
        }
        ShellCommand::Add { product_id } => {
            let _ = state.add_to_cart(&product_id, term).await;
        }
        ShellCommand::Remove { item_id } => {
            if state.remove_from_cart(&item_id, term).await.is_ok() {
                CartView::from(state.cart().items()).render(term.output())?;
            }
        }
        ShellCommand::Checkout => {
            let _ = state.checkout(term).await;
        }
        ShellCommand::View { name } => {
            state.set_view(name).await;
            render_view(state, term.output())?;
        }
        ShellCommand::Orders => {
            let _ = state.load_orders().await;
            render_orders(term.output(), state.admin().orders())?;
        }
        ShellCommand::CreateProduct {
            name,
            description,
            price,
            category,
            image_url,
            stock,
        } => {
            let form = ProductForm {
                name,
                description,
                price,
                category,
                image_url,
                stock,
            };
            match form.validate() {
                Ok(product) => {
                    let _ = state.create_product(&product, term).await;
                }
                Err(e) => writeln!(term.output(), "Invalid product: {e}")?,
            }
        }
        ShellCommand::DeleteProduct { product_id } => {
            let _ = state.delete_product(&product_id, term).await;
        }
        ShellCommand::Refresh => {
            state.refresh().await;
            render_view(state, term.output())?;
        }
        ShellCommand::Help => write!(term.output(), "{}", help_text())?,
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Render the active view from cached state.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_view(state: &AppState, out: &mut impl Write) -> io::Result<()> {
    match state.view() {
        View::Home => render_home(out, state.catalog().featured()),
        View::Products => {
            let title = state
                .category()
                .map_or_else(|| "All Products".to_string(), |c| format!("{c} Products"));
            render_products(out, &title, state.catalog().filter(state.category()))
        }
        View::Cart => CartView::from(state.cart().items()).render(out),
        View::Admin => {
            render_orders(out, state.admin().orders())?;
            render_products(out, "Manage Products", state.catalog().products())
        }
    }
}
