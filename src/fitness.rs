use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const KG_PER_LB: f64 = 0.453592;
const CM_PER_INCH: f64 = 2.54;
const IMPERIAL_BMI_FACTOR: f64 = 703.0;
const GOAL_CALORIE_DELTA: i64 = 500;
const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_CARBS: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FitnessGoal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BmiCategory {
    Underweight,
    #[serde(rename = "Normal Weight")]
    NormalWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::NormalWeight
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalculatorInput {
    /// Centimetres (metric) or inches (imperial).
    pub height: f64,
    /// Kilograms (metric) or pounds (imperial).
    pub weight: f64,
    pub age: u32,
    pub gender: Gender,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub fitness_goal: FitnessGoal,
    #[serde(default)]
    pub units: Units,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Macros {
    pub protein_g: i64,
    pub carbs_g: i64,
    pub fat_g: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct CalculatorResult {
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub bmr: i64,
    pub tdee: i64,
    pub daily_calories: i64,
    pub macros: Macros,
}

pub fn bmi(height: f64, weight: f64, units: Units) -> f64 {
    let raw = match units {
        Units::Metric => {
            let metres = height / 100.0;
            weight / (metres * metres)
        }
        Units::Imperial => weight / (height * height) * IMPERIAL_BMI_FACTOR,
    };
    (raw * 10.0).round() / 10.0
}

pub fn bmr(height: f64, weight: f64, age: u32, gender: Gender, units: Units) -> i64 {
    let (weight_kg, height_cm) = match units {
        Units::Metric => (weight, height),
        Units::Imperial => (weight * KG_PER_LB, height * CM_PER_INCH),
    };
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    let adjusted = match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    };
    adjusted.round() as i64
}

pub fn tdee(bmr: i64, activity: ActivityLevel) -> i64 {
    (bmr as f64 * activity.multiplier()).round() as i64
}

pub fn daily_calories(tdee: i64, goal: FitnessGoal) -> i64 {
    match goal {
        FitnessGoal::Lose => tdee - GOAL_CALORIE_DELTA,
        FitnessGoal::Maintain => tdee,
        FitnessGoal::Gain => tdee + GOAL_CALORIE_DELTA,
    }
}

pub fn macros(calories: i64, goal: FitnessGoal) -> Macros {
    let (protein, carbs, fat) = match goal {
        FitnessGoal::Lose => (0.35, 0.35, 0.30),
        FitnessGoal::Maintain | FitnessGoal::Gain => (0.30, 0.40, 0.30),
    };
    let calories = calories as f64;
    Macros {
        protein_g: (calories * protein / KCAL_PER_GRAM_PROTEIN).round() as i64,
        carbs_g: (calories * carbs / KCAL_PER_GRAM_CARBS).round() as i64,
        fat_g: (calories * fat / KCAL_PER_GRAM_FAT).round() as i64,
    }
}

pub fn calculate(input: &CalculatorInput) -> CalculatorResult {
    let bmi = bmi(input.height, input.weight, input.units);
    let bmr = bmr(input.height, input.weight, input.age, input.gender, input.units);
    let tdee = tdee(bmr, input.activity_level);
    let daily_calories = daily_calories(tdee, input.fitness_goal);
    CalculatorResult {
        bmi,
        bmi_category: BmiCategory::from_bmi(bmi),
        bmr,
        tdee,
        daily_calories,
        macros: macros(daily_calories, input.fitness_goal),
    }
}
