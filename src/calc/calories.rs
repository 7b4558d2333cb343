/// Calories for `consumed` grams, or `None` when the food has no calorie density.
pub fn compute_calories(consumed: f64, calories_per_gram: Option<f64>) -> Option<f64> {
    calories_per_gram.map(|density| consumed * density)
}
