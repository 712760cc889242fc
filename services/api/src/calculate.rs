use clap::{Args, Subcommand};
use greenwallet::calculators::{
    AfforestationInput, ApplianceAction, CalculationOutcome, CalculationRequest, CalculationType,
    ElectricityInput, Frequency, ImpactOutcome, RateTable, Selection, SolarInput, TransportInput,
    TransportMode, TreeSpecies, WaterAction, WaterInput,
};
use greenwallet::error::AppError;
use serde_json::json;

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// Print the full result as JSON instead of a summary
    #[arg(long, global = true)]
    pub(crate) json: bool,
    #[command(subcommand)]
    pub(crate) calculator: CalculatorCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum CalculatorCommand {
    /// Rooftop solar generation
    Solar(SolarArgs),
    /// Tree planting
    Afforestation(AfforestationArgs),
    /// Water conservation, estimated from the bill or a specific action
    Water {
        #[command(subcommand)]
        mode: WaterCommand,
    },
    /// Switching to a cleaner transport mode
    Transport(TransportArgs),
    /// Swapping to a more efficient appliance
    Electricity(ElectricityArgs),
}

#[derive(Args, Debug)]
pub(crate) struct SolarArgs {
    /// Usable rooftop area in square feet
    #[arg(long)]
    rooftop_area_sqft: f64,
    /// Average peak sunlight hours per day (up to 12)
    #[arg(long)]
    sunlight_hours_per_day: f64,
    /// Current monthly electricity bill, shown for reference
    #[arg(long)]
    monthly_bill_rupees: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct AfforestationArgs {
    #[arg(long)]
    trees: f64,
    #[arg(long)]
    land_area_sqft: f64,
    #[arg(long)]
    years: f64,
    #[arg(long, value_parser = parse_selection::<TreeSpecies>)]
    species: TreeSpecies,
}

#[derive(Subcommand, Debug)]
pub(crate) enum WaterCommand {
    /// Assume a flat reduction of the monthly water bill
    Bill {
        #[arg(long)]
        monthly_bill_rupees: f64,
    },
    /// Savings from a specific conservation action
    Action {
        #[arg(long)]
        liters_per_month: f64,
        #[arg(long, value_parser = parse_selection::<WaterAction>)]
        action: WaterAction,
    },
}

#[derive(Args, Debug)]
pub(crate) struct TransportArgs {
    #[arg(long)]
    distance_km: f64,
    #[arg(long, value_parser = parse_selection::<Frequency>)]
    frequency: Frequency,
    /// Mode currently used
    #[arg(long = "from", value_parser = parse_selection::<TransportMode>)]
    current_mode: TransportMode,
    /// Mode to switch to
    #[arg(long = "to", value_parser = parse_selection::<TransportMode>)]
    alternate_mode: TransportMode,
}

#[derive(Args, Debug)]
pub(crate) struct ElectricityArgs {
    #[arg(long, value_parser = parse_selection::<ApplianceAction>)]
    action: ApplianceAction,
    #[arg(long)]
    hours_per_day: f64,
    #[arg(long)]
    days_per_month: f64,
}

fn parse_selection<T: Selection>(raw: &str) -> Result<T, String> {
    T::parse(raw).map_err(|err| {
        let known: Vec<_> = T::ordered().iter().map(|option| option.id()).collect();
        format!("{err} (expected one of: {})", known.join(", "))
    })
}

impl CalculatorCommand {
    fn into_request(self) -> CalculationRequest {
        match self {
            Self::Solar(args) => CalculationRequest::Solar(SolarInput {
                monthly_bill_rupees: args.monthly_bill_rupees,
                rooftop_area_sqft: Some(args.rooftop_area_sqft),
                sunlight_hours_per_day: Some(args.sunlight_hours_per_day),
            }),
            Self::Afforestation(args) => CalculationRequest::Afforestation(AfforestationInput {
                number_of_trees: Some(args.trees),
                land_area_sqft: Some(args.land_area_sqft),
                years_of_growth: Some(args.years),
                tree_species: Some(args.species),
            }),
            Self::Water {
                mode: WaterCommand::Bill {
                    monthly_bill_rupees,
                },
            } => CalculationRequest::Water(WaterInput::Bill {
                monthly_bill_rupees: Some(monthly_bill_rupees),
            }),
            Self::Water {
                mode:
                    WaterCommand::Action {
                        liters_per_month,
                        action,
                    },
            } => CalculationRequest::Water(WaterInput::Action {
                liters_per_month: Some(liters_per_month),
                action: Some(action),
            }),
            Self::Transport(args) => CalculationRequest::Transport(TransportInput {
                distance_km: Some(args.distance_km),
                frequency: Some(args.frequency),
                current_mode: Some(args.current_mode),
                alternate_mode: Some(args.alternate_mode),
            }),
            Self::Electricity(args) => CalculationRequest::Electricity(ElectricityInput {
                appliance_action: Some(args.action),
                hours_per_day: Some(args.hours_per_day),
                days_per_month: Some(args.days_per_month),
            }),
        }
    }
}

pub(crate) fn run_calculate(args: CalculateArgs) -> Result<(), AppError> {
    let CalculateArgs { json, calculator } = args;
    let outcome = calculator.into_request().calculate(&RateTable::STANDARD)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&outcome_json(&outcome)).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        for line in render_outcome(&outcome) {
            println!("{line}");
        }
    }
    Ok(())
}

pub(crate) fn run_types() -> Result<(), AppError> {
    println!("Supported calculation types");
    for kind in CalculationType::ordered() {
        println!("- {} ({})", kind.label(), kind.id());
    }
    Ok(())
}

fn outcome_json(outcome: &CalculationOutcome) -> serde_json::Value {
    json!({
        "title": outcome.title(),
        "summary": outcome.summary(),
        "details": outcome.details(),
        "calculation": outcome,
    })
}

fn render_outcome(outcome: &CalculationOutcome) -> Vec<String> {
    let summary = outcome.summary();
    let mut lines = vec![
        format!("{} [{}]", outcome.title(), outcome.calculation_type().label()),
        format!("- Money saved: ₹{:.2} / month", summary.money_saved),
        format!("- CO2 reduced: {:.1} kg", summary.co2_reduced_kg),
        format!("- Points earned: {}", summary.points),
        "Details:".to_string(),
    ];
    lines.extend(
        outcome
            .details()
            .into_iter()
            .map(|(key, value)| format!("  - {}: {}", key.replace('_', " "), value)),
    );
    lines
}
